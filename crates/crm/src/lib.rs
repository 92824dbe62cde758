pub mod adapter;
pub mod error;
pub mod token;
pub mod transport;
pub mod wire;

use inmeet_core::config::CrmConfig;

pub use adapter::{SubmissionAdapter, SubmissionReceipt};
pub use error::{SubmissionError, TokenError, TransportError};
pub use token::{
    FileTokenStore, MemoryTokenStore, OAuthRefreshClient, RefreshTokenStore,
    RefreshingTokenProvider, TokenExchange, TokenProvider,
};
pub use transport::{AuthenticatedPost, HttpResponse, TeamleaderTransport};
pub use wire::QuotationCreateRequest;

pub type TeamleaderAdapter = SubmissionAdapter<
    TeamleaderTransport<RefreshingTokenProvider<OAuthRefreshClient, FileTokenStore>>,
>;

/// Wires the Teamleader transport from configuration: file-backed refresh
/// token store, OAuth refresh client and the `quotations.create` adapter.
pub fn teamleader_adapter(config: &CrmConfig) -> Result<TeamleaderAdapter, SubmissionError> {
    let (client_id, client_secret) = config
        .require_credentials()
        .map_err(|error| SubmissionError::Configuration(error.to_string()))?;
    let client = transport::build_client(config.timeout_secs)?;

    let store = FileTokenStore::new(&config.token_file, config.refresh_token.clone());
    let exchange =
        OAuthRefreshClient::new(client.clone(), &config.token_url, client_id, client_secret);
    let tokens = RefreshingTokenProvider::new(exchange, store);

    Ok(SubmissionAdapter::new(TeamleaderTransport::new(client, &config.api_base, tokens)))
}
