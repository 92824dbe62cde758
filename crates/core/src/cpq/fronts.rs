use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::catalog::{ModelCatalog, ModelKey};
use crate::cpq::pricing::{
    DRAWER_UNIT_PRICE, FREIGHT_FEE, HINGE_UNIT_PRICE, INSPECTION_FEE, MONTAGE_PER_FRONT,
};
use crate::domain::fronts::{FrontsInput, PartKind};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrontPricingError {
    #[error(
        "unknown model for style code `{style_code}` and material `{material_code}`; \
         check the model and material cells on the fronts sheet"
    )]
    UnknownModel { style_code: String, material_code: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontPriceResult {
    pub model: ModelKey,
    pub front_count: u32,
    pub has_filler: bool,
    pub has_other: bool,
    pub price_per_front: Decimal,
    pub material_cost: Decimal,
    pub filler_surcharge: Decimal,
    pub other_surcharge: Decimal,
    pub montage_cost: Decimal,
    pub hinge_count: u32,
    pub hinge_cost: Decimal,
    pub drawer_count: u32,
    pub drawer_cost: Decimal,
    pub subtotal_excl_vat: Decimal,
}

/// Resolves the sheet's model cells and prices the renovation. An unresolved
/// model stops here, before any arithmetic.
pub fn price_fronts_input(
    catalog: &ModelCatalog,
    input: &FrontsInput,
) -> Result<FrontPriceResult, FrontPricingError> {
    let model = catalog.resolve(&input.style_code, &input.material_code).ok_or_else(|| {
        FrontPricingError::UnknownModel {
            style_code: input.style_code.trim().to_string(),
            material_code: input.material_code.trim().to_string(),
        }
    })?;

    Ok(price_fronts(catalog, &input.parts, model, input.hinge_count, input.drawer_count))
}

pub fn price_fronts(
    catalog: &ModelCatalog,
    parts: &[String],
    model: ModelKey,
    hinge_count: u32,
    drawer_count: u32,
) -> FrontPriceResult {
    let descriptor = catalog.describe(model);
    let kinds: Vec<PartKind> = parts.iter().filter_map(|part| PartKind::classify(part)).collect();

    let front_count = kinds.iter().filter(|kind| kind.is_front()).count() as u32;
    let has_filler = kinds.iter().any(|kind| matches!(kind, PartKind::Filler | PartKind::Plinth));
    let has_other = kinds.contains(&PartKind::Other);

    // One flat surcharge per category, however many parts trigger it.
    let filler_surcharge = if has_filler { descriptor.filler_surcharge } else { Decimal::ZERO };
    let other_surcharge = if has_other { descriptor.filler_surcharge } else { Decimal::ZERO };

    let fronts = Decimal::from(front_count);
    let material_cost = fronts * descriptor.price_per_front;
    let montage_cost = fronts * MONTAGE_PER_FRONT;
    let hinge_cost = Decimal::from(hinge_count) * HINGE_UNIT_PRICE;
    let drawer_cost = Decimal::from(drawer_count) * DRAWER_UNIT_PRICE;

    let subtotal_excl_vat = material_cost
        + filler_surcharge
        + other_surcharge
        + montage_cost
        + INSPECTION_FEE
        + FREIGHT_FEE
        + hinge_cost
        + drawer_cost;

    FrontPriceResult {
        model,
        front_count,
        has_filler,
        has_other,
        price_per_front: descriptor.price_per_front,
        material_cost,
        filler_surcharge,
        other_surcharge,
        montage_cost,
        hinge_count,
        hinge_cost,
        drawer_count,
        drawer_cost,
        subtotal_excl_vat,
    }
}
