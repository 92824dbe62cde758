pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod sheet;

pub use cpq::cabinets::{CabinetError, CabinetPriceResult, CabinetPricing, SkippedCabinet};
pub use cpq::catalog::{CatalogError, ModelCatalog, ModelDescriptor, ModelKey};
pub use cpq::fronts::{FrontPriceResult, FrontPricingError};
pub use cpq::pricing::{round_amount, PriceBreakdown};
pub use cpq::{
    DeterministicQuotationRuntime, PricedQuotation, QuotationInput, QuotationRuntime,
    QuotationSummary,
};
pub use domain::cabinet::{CabinetRecord, CabinetType, VisibleSide};
pub use domain::fronts::{CustomerInfo, FrontsInput};
pub use domain::quotation::{LineItem, QuotationMode, QuotationPayload, Section};
pub use errors::{ApplicationError, InterfaceError, QuotationError};
pub use sheet::{ExtractedWorkbook, JsonSheetReader, SheetError, SheetReader};
