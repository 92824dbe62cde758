use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no refresh token available; authorize the integration first")]
    MissingRefreshToken,
    #[error("could not access token file `{path}`: {source}")]
    Store { path: PathBuf, source: std::io::Error },
    #[error("token request failed: {0}")]
    Request(String),
    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("failed to decode token response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("http client could not be built: {0}")]
    Client(String),
    #[error("request to `{url}` failed: {message}")]
    Request { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("deal id is required to submit a quotation")]
    MissingDealId,
    #[error("crm configuration is incomplete: {0}")]
    Configuration(String),
    #[error("failed to encode quotation: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("quotation was not created (status {status}): {body}")]
    Rejected { status: u16, body: String },
}
