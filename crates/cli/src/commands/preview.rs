use std::path::Path;

use inmeet_core::cpq::QuotationRuntime;
use inmeet_core::domain::quotation::QuotationMode;
use inmeet_crm::QuotationCreateRequest;

use crate::commands::{workbook, CommandResult};

/// Renders the exact request body `submit` would send, without sending it.
pub fn run(
    input: &Path,
    mode: QuotationMode,
    deal_id: &str,
    correlation_id: &str,
) -> CommandResult {
    let loaded = match workbook::load("preview", input, correlation_id) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let payload = loaded.runtime.compose(&loaded.priced, mode);
    let request = QuotationCreateRequest::new(deal_id.trim(), &payload);
    let line_count: usize = payload.sections.iter().map(|section| section.line_items.len()).sum();

    CommandResult::success_with_data(
        "preview",
        format!("{mode} quotation with {} sections and {line_count} lines", payload.sections.len()),
        Some(request),
    )
}
