use std::path::Path;

use inmeet_core::cpq::QuotationRuntime;
use inmeet_core::domain::quotation::QuotationMode;
use serde_json::json;

use crate::commands::{workbook, CommandResult};

pub fn run(input: &Path, mode: Option<QuotationMode>, correlation_id: &str) -> CommandResult {
    let loaded = match workbook::load("price", input, correlation_id) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let summary = loaded.runtime.summarize(&loaded.priced);
    let message = format!(
        "{} priced at {} excl. VAT ({} incl. VAT)",
        display_project(&summary.project),
        summary.total_excl_vat,
        summary.total_incl_vat
    );
    let sections = mode.map(|mode| loaded.runtime.compose(&loaded.priced, mode).sections);

    CommandResult::success_with_data(
        "price",
        message,
        Some(json!({ "summary": summary, "sections": sections })),
    )
}

fn display_project(project: &str) -> &str {
    if project.trim().is_empty() {
        "quotation"
    } else {
        project
    }
}
