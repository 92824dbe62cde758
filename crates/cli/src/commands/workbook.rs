use std::path::Path;

use inmeet_core::config::ConfigError;
use inmeet_core::cpq::{DeterministicQuotationRuntime, PricedQuotation, QuotationRuntime};
use inmeet_core::errors::{ApplicationError, QuotationError};
use inmeet_core::sheet::{JsonSheetReader, SheetReader};
use tracing::warn;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_INPUT};

pub struct LoadedQuotation {
    pub runtime: DeterministicQuotationRuntime,
    pub priced: PricedQuotation,
}

/// Reads the extracted workbook at `input` and prices it.
pub fn load(
    command: &str,
    input: &Path,
    correlation_id: &str,
) -> Result<LoadedQuotation, CommandResult> {
    let workbook = JsonSheetReader
        .read(input)
        .map_err(|error| input_failure(command, error.into(), correlation_id))?;

    let runtime = DeterministicQuotationRuntime::default();
    let priced = runtime
        .price_workbook(&workbook)
        .map_err(|error| input_failure(command, error, correlation_id))?;

    Ok(LoadedQuotation { runtime, priced })
}

pub fn input_failure(command: &str, error: QuotationError, correlation_id: &str) -> CommandResult {
    let interface = ApplicationError::from(error).into_interface(correlation_id);
    warn!(
        event_name = "cli.quotation.rejected_input",
        correlation_id,
        command,
        error = %interface,
        "workbook could not be priced"
    );
    CommandResult::traced_failure(
        command,
        "input",
        interface.message(),
        EXIT_INPUT,
        Some(correlation_id),
    )
}

pub fn config_failure(command: &str, error: &ConfigError, correlation_id: &str) -> CommandResult {
    let interface =
        ApplicationError::Configuration(error.to_string()).into_interface(correlation_id);
    CommandResult::traced_failure(
        command,
        "config_validation",
        format!("configuration issue: {}", interface.message()),
        EXIT_CONFIG,
        Some(correlation_id),
    )
}
