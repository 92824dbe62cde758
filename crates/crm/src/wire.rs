//! `quotations.create` request body.

use inmeet_core::cpq::pricing::round_amount;
use inmeet_core::domain::quotation::{LineItem, QuotationPayload, Section};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The CRM rejects an empty quotation text, so a zero-width space is sent.
pub const EMPTY_TEXT: &str = "\u{200b}";
pub const TAX_EXCLUDING: &str = "excluding";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotationCreateRequest {
    pub deal_id: String,
    pub currency: WireCurrency,
    pub grouped_lines: Vec<WireGroupedLines>,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireCurrency {
    pub code: String,
    pub exchange_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireGroupedLines {
    pub section: WireSection,
    pub line_items: Vec<WireLineItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireSection {
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireLineItem {
    pub quantity: u32,
    pub description: String,
    pub extended_description: String,
    pub unit_price: WireUnitPrice,
    pub tax_rate_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireUnitPrice {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub tax: String,
}

impl QuotationCreateRequest {
    pub fn new(deal_id: impl Into<String>, payload: &QuotationPayload) -> Self {
        Self {
            deal_id: deal_id.into(),
            currency: WireCurrency { code: payload.currency.clone(), exchange_rate: 1.0 },
            grouped_lines: payload.sections.iter().map(WireGroupedLines::from).collect(),
            text: EMPTY_TEXT.to_string(),
        }
    }
}

impl From<&Section> for WireGroupedLines {
    fn from(section: &Section) -> Self {
        Self {
            section: WireSection { title: section.title.clone() },
            line_items: section.line_items.iter().map(WireLineItem::from).collect(),
        }
    }
}

impl From<&LineItem> for WireLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            quantity: item.quantity,
            description: item.description.clone(),
            extended_description: item.extended_description.clone(),
            unit_price: WireUnitPrice {
                amount: round_amount(item.unit_price),
                tax: TAX_EXCLUDING.to_string(),
            },
            tax_rate_id: item.tax_rate_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use inmeet_core::domain::quotation::{LineItem, QuotationMode, QuotationPayload, Section};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::QuotationCreateRequest;

    fn payload() -> QuotationPayload {
        QuotationPayload {
            mode: QuotationMode::Dealer,
            currency: "EUR".to_string(),
            sections: vec![Section::new(
                "ACCESSOIRES",
                vec![LineItem::new(
                    3,
                    "Bovenkast maatwerk",
                    &["Type: C".to_string(), "Inrichting: Geen".to_string()],
                    Decimal::new(622_675, 3),
                )],
            )],
        }
    }

    #[test]
    fn serializes_the_documented_body() {
        let request = QuotationCreateRequest::new("deal-42", &payload());
        let value = serde_json::to_value(&request).expect("serializes");

        assert_eq!(
            value,
            json!({
                "deal_id": "deal-42",
                "currency": { "code": "EUR", "exchange_rate": 1.0 },
                "grouped_lines": [{
                    "section": { "title": "ACCESSOIRES" },
                    "line_items": [{
                        "quantity": 3,
                        "description": "Bovenkast maatwerk",
                        "extended_description": "Type: C\r\nInrichting: Geen",
                        "unit_price": { "amount": 622.68, "tax": "excluding" },
                        "tax_rate_id": "94da9f7d-9bf3-04fb-ac49-404ed252c381"
                    }]
                }],
                "text": "\u{200b}"
            })
        );
    }

    #[test]
    fn amounts_are_json_numbers_rounded_to_cents() {
        let request = QuotationCreateRequest::new("deal-42", &payload());
        let amount = &request.grouped_lines[0].line_items[0].unit_price.amount;
        assert_eq!(*amount, Decimal::new(62_268, 2));

        let raw = serde_json::to_string(&request).expect("serializes");
        assert!(raw.contains("\"amount\":622.68"));
    }
}
