use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cpq::fronts::FrontPriceResult;

/// Dutch VAT, applied once to the grand total excluding VAT.
pub const VAT_RATE: Decimal = Decimal::from_parts(21, 0, 0, false, 2);

pub const MONTAGE_PER_FRONT: Decimal = cents(3471);
pub const INSPECTION_FEE: Decimal = cents(9917);
pub const FREIGHT_FEE: Decimal = cents(6000);
pub const HINGE_UNIT_PRICE: Decimal = cents(650);
pub const DRAWER_UNIT_PRICE: Decimal = cents(18400);

pub const fn cents(amount: u32) -> Decimal {
    Decimal::from_parts(amount, 0, 0, false, 2)
}

/// Presentation rounding; only applied when an amount leaves the engine.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

/// Per-quotation totals. Built once from the front and cabinet results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub front_material: Decimal,
    pub filler_surcharge: Decimal,
    pub other_surcharge: Decimal,
    pub montage: Decimal,
    pub inspection: Decimal,
    pub freight: Decimal,
    pub hinges: Decimal,
    pub drawers: Decimal,
    pub front_subtotal_excl_vat: Decimal,
    pub cabinets_excl_vat: Decimal,
    pub grand_excl_vat: Decimal,
    pub vat: Decimal,
    pub grand_incl_vat: Decimal,
}

impl PriceBreakdown {
    pub fn new(fronts: &FrontPriceResult, cabinets_excl_vat: Decimal) -> Self {
        let grand_excl_vat = fronts.subtotal_excl_vat + cabinets_excl_vat;
        let vat = grand_excl_vat * VAT_RATE;

        Self {
            front_material: fronts.material_cost,
            filler_surcharge: fronts.filler_surcharge,
            other_surcharge: fronts.other_surcharge,
            montage: fronts.montage_cost,
            inspection: INSPECTION_FEE,
            freight: FREIGHT_FEE,
            hinges: fronts.hinge_cost,
            drawers: fronts.drawer_cost,
            front_subtotal_excl_vat: fronts.subtotal_excl_vat,
            cabinets_excl_vat,
            grand_excl_vat,
            vat,
            grand_incl_vat: grand_excl_vat + vat,
        }
    }

    pub fn trace(&self) -> Vec<PricingTraceStep> {
        [
            ("front_material", "front_count * price_per_front", self.front_material),
            ("filler_surcharge", "flat, any filler or plinth", self.filler_surcharge),
            ("other_surcharge", "flat, any other part", self.other_surcharge),
            ("montage", "front_count * montage_per_front", self.montage),
            ("inspection", "fixed", self.inspection),
            ("freight", "fixed", self.freight),
            ("hinges", "hinge_count * hinge_unit_price", self.hinges),
            ("drawers", "drawer_count * drawer_unit_price", self.drawers),
            ("cabinets", "sum(cabinet sell price)", self.cabinets_excl_vat),
            ("vat", "grand_excl_vat * 0.21", self.vat),
        ]
        .into_iter()
        .map(|(stage, detail, amount)| PricingTraceStep {
            stage: stage.to_string(),
            detail: detail.to_string(),
            amount: round_amount(amount),
        })
        .collect()
    }
}
