//! OAuth refresh-token rotation.
//!
//! Every refresh returns a new refresh token and invalidates the old one, so
//! the rotated token is persisted before the access token is handed out.
//! Refreshes are serialized so two concurrent submissions never spend the
//! same refresh token.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::TokenError;

pub trait RefreshTokenStore: Send + Sync {
    fn load(&self) -> Result<Option<SecretString>, TokenError>;
    fn save(&self, token: &SecretString) -> Result<(), TokenError>;
}

/// Keeps the refresh token in a file. Until the first rotation the token
/// comes from `fallback`.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    fallback: Option<SecretString>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, fallback: Option<SecretString>) -> Self {
        Self { path: path.into(), fallback }
    }

    fn store_error(&self, source: std::io::Error) -> TokenError {
        TokenError::Store { path: self.path.clone(), source }
    }
}

impl RefreshTokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if !raw.trim().is_empty() => Ok(Some(raw.trim().to_string().into())),
            Ok(_) => Ok(self.fallback.clone()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(self.fallback.clone()),
            Err(error) => Err(self.store_error(error)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| self.store_error(error))?;
        }
        fs::write(&self.path, token.expose_secret()).map_err(|error| self.store_error(error))
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SecretString>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token: Mutex::new(token) }
    }
}

impl RefreshTokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenError> {
        let token = self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(token.clone())
    }

    fn save(&self, token: &SecretString) -> Result<(), TokenError> {
        let mut slot = self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(token.clone());
        Ok(())
    }
}

#[derive(Debug)]
pub struct TokenGrant {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

/// One `grant_type=refresh_token` round trip against the token endpoint.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenGrant, TokenError>;
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct OAuthRefreshClient {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
}

impl OAuthRefreshClient {
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self { client, token_url: token_url.into(), client_id: client_id.into(), client_secret }
    }
}

#[async_trait]
impl TokenExchange for OAuthRefreshClient {
    async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenGrant, TokenError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.expose_secret()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
            ])
            .send()
            .await
            .map_err(|error| TokenError::Request(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::Rejected { status: status.as_u16(), body });
        }

        let token: OAuthTokenResponse =
            response.json().await.map_err(|error| TokenError::Decode(error.to_string()))?;
        if token.access_token.is_empty() {
            return Err(TokenError::Decode("token endpoint returned empty access token".into()));
        }

        Ok(TokenGrant {
            access_token: token.access_token.into(),
            refresh_token: token.refresh_token.filter(|value| !value.is_empty()).map(Into::into),
        })
    }
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<SecretString, TokenError>;
}

pub struct RefreshingTokenProvider<E, S> {
    exchange: E,
    store: S,
    rotation: tokio::sync::Mutex<()>,
}

impl<E, S> RefreshingTokenProvider<E, S> {
    pub fn new(exchange: E, store: S) -> Self {
        Self { exchange, store, rotation: tokio::sync::Mutex::new(()) }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<E, S> TokenProvider for RefreshingTokenProvider<E, S>
where
    E: TokenExchange,
    S: RefreshTokenStore,
{
    async fn access_token(&self) -> Result<SecretString, TokenError> {
        let _rotation = self.rotation.lock().await;

        let refresh_token = self.store.load()?.ok_or(TokenError::MissingRefreshToken)?;
        let grant = match self.exchange.refresh(&refresh_token).await {
            Ok(grant) => grant,
            Err(error) => {
                warn!(
                    event_name = "crm.token.refresh_failed",
                    error = %error,
                    "refresh token exchange failed"
                );
                return Err(error);
            }
        };

        match &grant.refresh_token {
            Some(rotated) => {
                self.store.save(rotated)?;
                info!(event_name = "crm.token.rotated", "refresh token rotated and persisted");
            }
            None => {
                warn!(
                    event_name = "crm.token.not_rotated",
                    "token endpoint did not return a new refresh token"
                );
            }
        }

        Ok(grant.access_token)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use secrecy::{ExposeSecret, SecretString};

    use super::{
        FileTokenStore, MemoryTokenStore, RefreshTokenStore, RefreshingTokenProvider,
        TokenExchange, TokenGrant, TokenProvider,
    };
    use crate::error::TokenError;

    /// Accepts only the refresh token it issued last, like the real endpoint.
    #[derive(Default)]
    struct RotatingExchange {
        issued: AtomicUsize,
    }

    #[async_trait]
    impl TokenExchange for RotatingExchange {
        async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenGrant, TokenError> {
            let issued = self.issued.load(Ordering::SeqCst);
            if refresh_token.expose_secret() != format!("refresh-{issued}") {
                return Err(TokenError::Rejected { status: 400, body: "invalid_grant".into() });
            }
            let next = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TokenGrant {
                access_token: format!("access-{next}").into(),
                refresh_token: Some(format!("refresh-{next}").into()),
            })
        }
    }

    fn secret(value: &str) -> SecretString {
        value.to_string().into()
    }

    #[tokio::test]
    async fn rotated_refresh_token_is_persisted() {
        let provider = RefreshingTokenProvider::new(
            RotatingExchange::default(),
            MemoryTokenStore::new(Some(secret("refresh-0"))),
        );

        let first = provider.access_token().await.expect("first token");
        let second = provider.access_token().await.expect("second token");

        assert_eq!(first.expose_secret(), "access-1");
        assert_eq!(second.expose_secret(), "access-2");
        let stored = provider.store().load().expect("load").expect("stored token");
        assert_eq!(stored.expose_secret(), "refresh-2");
    }

    #[tokio::test]
    async fn concurrent_requests_never_reuse_a_refresh_token() {
        let provider = Arc::new(RefreshingTokenProvider::new(
            RotatingExchange::default(),
            MemoryTokenStore::new(Some(secret("refresh-0"))),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { provider.access_token().await })
            })
            .collect();

        for handle in handles {
            let token = handle.await.expect("task joins");
            assert!(token.is_ok(), "every concurrent refresh should succeed");
        }
    }

    #[tokio::test]
    async fn missing_refresh_token_is_reported() {
        let provider =
            RefreshingTokenProvider::new(RotatingExchange::default(), MemoryTokenStore::default());

        let error = provider.access_token().await.expect_err("no token");
        assert!(matches!(error, TokenError::MissingRefreshToken));
    }

    #[test]
    fn file_store_prefers_the_file_over_the_fallback() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state").join("refresh_token.txt");
        let store = FileTokenStore::new(&path, Some(secret("from-env")));

        let first = store.load().expect("load").expect("fallback");
        assert_eq!(first.expose_secret(), "from-env");

        store.save(&secret("rotated")).expect("save");
        assert_eq!(fs::read_to_string(&path).expect("token file"), "rotated");

        let second = store.load().expect("load").expect("file token");
        assert_eq!(second.expose_secret(), "rotated");
    }

    #[tokio::test]
    async fn file_store_survives_a_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("refresh_token.txt");

        let provider = RefreshingTokenProvider::new(
            RotatingExchange::default(),
            FileTokenStore::new(&path, Some(secret("refresh-0"))),
        );
        provider.access_token().await.expect("token");

        let restarted = FileTokenStore::new(&path, Some(secret("refresh-0")));
        let token = restarted.load().expect("load").expect("token");
        assert_eq!(token.expose_secret(), "refresh-1");
    }
}
