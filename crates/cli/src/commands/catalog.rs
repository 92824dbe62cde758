use inmeet_core::cpq::{DeterministicQuotationRuntime, QuotationRuntime};
use inmeet_core::ModelKey;
use serde::Serialize;
use serde_json::json;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct Selection<'a> {
    style: &'a str,
    material: &'a str,
    model: ModelKey,
}

pub fn run() -> CommandResult {
    let runtime = DeterministicQuotationRuntime::default();
    let catalog = runtime.catalog();

    let models: Vec<_> = catalog.descriptors().collect();
    let selections: Vec<_> = catalog
        .selections()
        .map(|(style, material, model)| Selection { style, material, model })
        .collect();

    CommandResult::success_with_data(
        "catalog",
        format!("{} models, {} style/material selections", models.len(), selections.len()),
        Some(json!({ "models": models, "selections": selections })),
    )
}
