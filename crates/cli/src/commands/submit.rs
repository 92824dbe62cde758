use std::path::Path;

use inmeet_core::config::InmeetConfig;
use inmeet_core::cpq::QuotationRuntime;
use inmeet_core::domain::quotation::QuotationMode;
use inmeet_core::errors::ApplicationError;
use inmeet_crm::{teamleader_adapter, SubmissionError};
use tracing::{error, info};

use crate::commands::{workbook, CommandResult, EXIT_CONFIG, EXIT_INPUT, EXIT_SUBMISSION};

pub fn run(
    config: &InmeetConfig,
    input: &Path,
    mode: QuotationMode,
    deal_id: &str,
    correlation_id: &str,
) -> CommandResult {
    if deal_id.trim().is_empty() {
        return submission_failure(SubmissionError::MissingDealId, correlation_id);
    }

    let loaded = match workbook::load("submit", input, correlation_id) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };
    let payload = loaded.runtime.compose(&loaded.priced, mode);

    let adapter = match teamleader_adapter(&config.crm) {
        Ok(adapter) => adapter,
        Err(error) => return submission_failure(error, correlation_id),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::traced_failure(
                "submit",
                "runtime",
                format!("failed to start async runtime: {error}"),
                1,
                Some(correlation_id),
            );
        }
    };

    info!(
        event_name = "cli.submit.started",
        correlation_id,
        deal_id = deal_id.trim(),
        mode = %mode,
        "submitting quotation"
    );

    match runtime.block_on(adapter.submit(deal_id, &payload)) {
        Ok(receipt) => {
            let message = match receipt.quotation_id.as_deref() {
                Some(id) => format!("quotation {id} created for deal {}", deal_id.trim()),
                None => format!("quotation created for deal {}", deal_id.trim()),
            };
            CommandResult::success_with_data("submit", message, Some(receipt))
        }
        Err(error) => submission_failure(error, correlation_id),
    }
}

fn submission_failure(error: SubmissionError, correlation_id: &str) -> CommandResult {
    let (error_class, exit_code, message) = match &error {
        SubmissionError::MissingDealId => ("input", EXIT_INPUT, error.to_string()),
        SubmissionError::Configuration(message) => {
            let interface = ApplicationError::Configuration(message.clone())
                .into_interface(correlation_id);
            let message = format!("configuration issue: {}", interface.message());
            ("config_validation", EXIT_CONFIG, message)
        }
        _ => {
            let interface =
                ApplicationError::Integration(error.to_string()).into_interface(correlation_id);
            let message = format!("{} ({})", interface.user_message(), interface.message());
            ("submission", EXIT_SUBMISSION, message)
        }
    };

    error!(
        event_name = "cli.submit.failed",
        correlation_id,
        error_class,
        error = %error,
        "quotation submission failed"
    );

    CommandResult::traced_failure("submit", error_class, message, exit_code, Some(correlation_id))
}
