use inmeet_core::domain::quotation::QuotationPayload;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::SubmissionError;
use crate::transport::AuthenticatedPost;
use crate::wire::QuotationCreateRequest;

pub const QUOTATIONS_CREATE: &str = "quotations.create";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub quotation_id: Option<String>,
    pub body: String,
}

/// Serializes a composed quotation and posts it for one deal. No retries.
pub struct SubmissionAdapter<T> {
    transport: T,
}

impl<T: AuthenticatedPost> SubmissionAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn submit(
        &self,
        deal_id: &str,
        payload: &QuotationPayload,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let deal_id = deal_id.trim();
        if deal_id.is_empty() {
            return Err(SubmissionError::MissingDealId);
        }

        let request = QuotationCreateRequest::new(deal_id, payload);
        let body = serde_json::to_value(&request)?;
        let response = self.transport.post_json(QUOTATIONS_CREATE, &body).await?;

        if !matches!(response.status, 200 | 201) {
            warn!(
                event_name = "crm.quotation.rejected",
                deal_id,
                status = response.status,
                "quotation was not created"
            );
            return Err(SubmissionError::Rejected { status: response.status, body: response.body });
        }

        let quotation_id = created_id(&response.body);
        info!(
            event_name = "crm.quotation.created",
            deal_id,
            status = response.status,
            quotation_id = quotation_id.as_deref().unwrap_or("unknown"),
            "quotation created"
        );

        Ok(SubmissionReceipt { status: response.status, quotation_id, body: response.body })
    }
}

fn created_id(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.pointer("/data/id").and_then(Value::as_str).map(str::to_string)
}
