pub mod cabinets;
pub mod catalog;
pub mod composer;
pub mod fitout;
pub mod fronts;
pub mod pricing;
pub mod staffel;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::domain::cabinet::CabinetRecord;
use crate::domain::fronts::{CustomerInfo, FrontsInput};
use crate::domain::quotation::{QuotationMode, QuotationPayload};
use crate::errors::QuotationError;
use crate::sheet::ExtractedWorkbook;

use self::{
    cabinets::{price_all, CabinetPricing, SkippedCabinet},
    catalog::{ModelCatalog, ModelKey},
    composer::{compose, ComposeInput},
    fronts::{price_fronts_input, FrontPriceResult},
    pricing::{round_amount, PriceBreakdown, PricingTraceStep},
};

#[derive(Clone, Debug)]
pub struct QuotationInput<'a> {
    pub fronts: &'a FrontsInput,
    pub cabinets: &'a [CabinetRecord],
}

/// One fully priced request. Everything needed to render either quotation
/// mode without touching the inputs again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PricedQuotation {
    pub project: String,
    pub color: String,
    pub customer: CustomerInfo,
    pub fronts: FrontPriceResult,
    pub cabinets: CabinetPricing,
    pub breakdown: PriceBreakdown,
}

/// Operator-facing overview of a priced request. Amounts are rounded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuotationSummary {
    pub project: String,
    pub model: ModelKey,
    pub material: String,
    pub color: String,
    pub front_count: u32,
    pub hinge_count: u32,
    pub drawer_count: u32,
    pub has_filler: bool,
    pub has_other: bool,
    pub cabinet_count: usize,
    pub skipped_cabinets: Vec<SkippedCabinet>,
    pub fronts_excl_vat: Decimal,
    pub cabinets_excl_vat: Decimal,
    pub total_excl_vat: Decimal,
    pub vat: Decimal,
    pub total_incl_vat: Decimal,
    pub trace: Vec<PricingTraceStep>,
}

pub trait QuotationRuntime: Send + Sync {
    fn catalog(&self) -> &ModelCatalog;

    fn price(&self, input: QuotationInput<'_>) -> Result<PricedQuotation, QuotationError>;

    fn price_workbook(
        &self,
        workbook: &ExtractedWorkbook,
    ) -> Result<PricedQuotation, QuotationError> {
        let fronts = workbook.fronts_input()?;
        let cabinets = workbook.cabinet_records()?;
        self.price(QuotationInput { fronts: &fronts, cabinets: &cabinets })
    }

    fn compose(&self, priced: &PricedQuotation, mode: QuotationMode) -> QuotationPayload {
        compose(
            self.catalog(),
            ComposeInput {
                fronts: &priced.fronts,
                cabinets: &priced.cabinets.priced,
                mode,
                customer: &priced.customer,
                color: &priced.color,
            },
        )
    }

    fn summarize(&self, priced: &PricedQuotation) -> QuotationSummary {
        let fronts = &priced.fronts;
        let breakdown = &priced.breakdown;
        QuotationSummary {
            project: priced.project.clone(),
            model: fronts.model,
            material: self.catalog().describe(fronts.model).material.clone(),
            color: priced.color.clone(),
            front_count: fronts.front_count,
            hinge_count: fronts.hinge_count,
            drawer_count: fronts.drawer_count,
            has_filler: fronts.has_filler,
            has_other: fronts.has_other,
            cabinet_count: priced.cabinets.priced.len(),
            skipped_cabinets: priced.cabinets.skipped.clone(),
            fronts_excl_vat: round_amount(breakdown.front_subtotal_excl_vat),
            cabinets_excl_vat: round_amount(breakdown.cabinets_excl_vat),
            total_excl_vat: round_amount(breakdown.grand_excl_vat),
            vat: round_amount(breakdown.vat),
            total_incl_vat: round_amount(breakdown.grand_incl_vat),
            trace: breakdown.trace(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DeterministicQuotationRuntime {
    catalog: ModelCatalog,
}

impl DeterministicQuotationRuntime {
    pub fn new(catalog: ModelCatalog) -> Self {
        Self { catalog }
    }
}

impl QuotationRuntime for DeterministicQuotationRuntime {
    fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    fn price(&self, input: QuotationInput<'_>) -> Result<PricedQuotation, QuotationError> {
        let fronts = price_fronts_input(&self.catalog, input.fronts)?;
        let cabinets = price_all(&self.catalog, input.cabinets)?;
        let breakdown = PriceBreakdown::new(&fronts, cabinets.total_sell_excl_vat);

        info!(
            event_name = "cpq.quotation.priced",
            project = %input.fronts.project,
            model = %fronts.model,
            front_count = fronts.front_count,
            cabinet_count = cabinets.priced.len(),
            skipped_cabinets = cabinets.skipped.len(),
            total_excl_vat = %round_amount(breakdown.grand_excl_vat),
            "quotation priced"
        );

        Ok(PricedQuotation {
            project: input.fronts.project.clone(),
            color: input.fronts.color.clone(),
            customer: input.fronts.customer.clone(),
            fronts,
            cabinets,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{DeterministicQuotationRuntime, QuotationInput, QuotationRuntime};
    use crate::cpq::catalog::ModelKey;
    use crate::domain::cabinet::{CabinetRecord, CabinetType, VisibleSide};
    use crate::domain::fronts::{CustomerInfo, FrontsInput};
    use crate::domain::quotation::QuotationMode;
    use crate::errors::QuotationError;

    fn scenario_a() -> FrontsInput {
        FrontsInput {
            parts: vec!["DEUR".to_string(); 10],
            style_code: "K01 - vlak".to_string(),
            material_code: "MDF gespoten".to_string(),
            color: "RAL 9010".to_string(),
            customer: CustomerInfo::new(["J. Jansen".to_string()]),
            hinge_count: 20,
            drawer_count: 2,
            project: "keuken-jansen".to_string(),
        }
    }

    fn scenario_b() -> CabinetRecord {
        let mut record = CabinetRecord::new(1, CabinetType::C);
        record.height_mm = Some(450);
        record.width_mm = Some(550);
        record.depth_mm = Some(350);
        record.fitout = "2x plank".to_string();
        record.hinge_count = 4;
        record.front_model = "JACK".to_string();
        record.visible_side = VisibleSide::Left;
        record
    }

    #[test]
    fn fronts_only_request_matches_the_reference_totals() {
        let runtime = DeterministicQuotationRuntime::default();
        let fronts = scenario_a();
        let priced =
            runtime.price(QuotationInput { fronts: &fronts, cabinets: &[] }).expect("priced");
        let summary = runtime.summarize(&priced);

        assert_eq!(summary.model, ModelKey::Noah);
        assert_eq!(summary.material, "MDF gespoten");
        assert_eq!(summary.front_count, 10);
        assert_eq!(summary.cabinet_count, 0);
        assert_eq!(summary.total_excl_vat, Decimal::new(197_117, 2));
        assert_eq!(summary.vat, Decimal::new(41_395, 2));
        assert_eq!(summary.total_incl_vat, Decimal::new(238_512, 2));
    }

    #[test]
    fn a_plinth_adds_the_filler_surcharge_once() {
        let runtime = DeterministicQuotationRuntime::default();
        let mut fronts = scenario_a();
        fronts.parts.push("PLINT".to_string());
        fronts.parts.push("PLINT".to_string());
        let priced =
            runtime.price(QuotationInput { fronts: &fronts, cabinets: &[] }).expect("priced");
        let summary = runtime.summarize(&priced);

        assert!(summary.has_filler);
        assert_eq!(summary.front_count, 10);
        assert_eq!(summary.total_excl_vat, Decimal::new(216_043, 2));
        assert_eq!(summary.total_incl_vat, Decimal::new(261_412, 2));
    }

    #[test]
    fn cabinets_add_to_the_grand_total_but_not_to_the_renovation_line() {
        let runtime = DeterministicQuotationRuntime::default();
        let fronts = scenario_a();
        let cabinets = vec![scenario_b(), CabinetRecord::new(2, CabinetType::A)];
        let priced = runtime.price(QuotationInput { fronts: &fronts, cabinets: &cabinets });
        let priced = priced.expect("priced");
        let summary = runtime.summarize(&priced);

        assert_eq!(summary.cabinet_count, 1);
        assert_eq!(summary.skipped_cabinets.len(), 1);
        assert_eq!(summary.cabinets_excl_vat, Decimal::new(62_268, 2));
        assert_eq!(summary.total_excl_vat, Decimal::new(259_385, 2));

        let payload = runtime.compose(&priced, QuotationMode::Consumer);
        let renovation = &payload.sections[1].line_items[0];
        assert_eq!(renovation.unit_price, priced.fronts.subtotal_excl_vat);
        assert_eq!(payload.total_excl_vat(), priced.breakdown.grand_excl_vat);

        let dealer = runtime.compose(&priced, QuotationMode::Dealer);
        assert_eq!(dealer.total_excl_vat(), priced.breakdown.grand_excl_vat);
    }

    #[test]
    fn unresolved_model_fails_before_pricing() {
        let runtime = DeterministicQuotationRuntime::default();
        let mut fronts = scenario_a();
        fronts.material_code = "Beton".to_string();

        let error = runtime
            .price(QuotationInput { fronts: &fronts, cabinets: &[scenario_b()] })
            .expect_err("unknown model");
        assert!(matches!(error, QuotationError::Fronts(_)));
    }

    #[test]
    fn invalid_tall_cabinet_fails_the_quotation() {
        let runtime = DeterministicQuotationRuntime::default();
        let fronts = scenario_a();
        let mut tall = scenario_b();
        tall.cabinet_type = CabinetType::B;
        tall.height_mm = Some(2900);

        let error = runtime
            .price(QuotationInput { fronts: &fronts, cabinets: &[tall] })
            .expect_err("tall height");
        assert!(matches!(error, QuotationError::Cabinet(_)));
    }
}
