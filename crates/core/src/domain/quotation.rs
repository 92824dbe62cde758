use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tax rate reference for 21% VAT in the destination CRM.
pub const TAX_RATE_21_ID: &str = "94da9f7d-9bf3-04fb-ac49-404ed252c381";
pub const CURRENCY_CODE: &str = "EUR";
/// Line break convention for multi-line CRM text fields.
pub const LINE_BREAK: &str = "\r\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationMode {
    /// Particulier: one bundled renovation line.
    Consumer,
    /// Dealer: itemized breakdown.
    Dealer,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unsupported quotation mode `{0}` (expected consumer|dealer)")]
pub struct ParseModeError(String);

impl FromStr for QuotationMode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "consumer" | "particulier" | "p" => Ok(Self::Consumer),
            "dealer" | "d" => Ok(Self::Dealer),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

impl fmt::Display for QuotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consumer => f.write_str("consumer"),
            Self::Dealer => f.write_str("dealer"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: u32,
    pub description: String,
    pub extended_description: String,
    /// Unrounded; rounding happens when the payload is serialized.
    pub unit_price: Decimal,
    pub tax_rate_id: String,
}

impl LineItem {
    pub fn new(
        quantity: u32,
        description: impl Into<String>,
        extended_lines: &[String],
        unit_price: Decimal,
    ) -> Self {
        Self {
            quantity,
            description: description.into(),
            extended_description: extended_lines.join(LINE_BREAK),
            unit_price,
            tax_rate_id: TAX_RATE_21_ID.to_string(),
        }
    }

    pub fn total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub line_items: Vec<LineItem>,
}

impl Section {
    pub fn new(title: impl Into<String>, line_items: Vec<LineItem>) -> Self {
        Self { title: title.into(), line_items }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationPayload {
    pub mode: QuotationMode,
    pub currency: String,
    pub sections: Vec<Section>,
}

impl QuotationPayload {
    pub fn total_excl_vat(&self) -> Decimal {
        self.sections.iter().flat_map(|section| &section.line_items).map(LineItem::total).sum()
    }
}
