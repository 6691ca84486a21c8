//! Push backend for a wallet backend server's `pushtx` endpoint.
//!
//! Servers that require authentication hand out short-lived access tokens in
//! exchange for an API key. Tokens are obtained on the first push, refreshed
//! once they reach [`TOKEN_REFRESH_INTERVAL`], and re-acquired by a fresh login
//! whenever refresh fails.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{error, info, warn};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::PushBackend;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Age after which the access token is refreshed before use.
pub const TOKEN_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// Endpoint settings for a wallet backend server.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SamouraiConfig {
    /// Base URL, without the trailing `/pushtx/`.
    pub url: String,
    /// API key, `None` when the server is open.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Authorizations {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    authorizations: Authorizations,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    status: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug)]
struct Tokens {
    access: String,
    refresh: Option<String>,
    obtained_at: Instant,
}

/// Broadcasts through a wallet backend's `pushtx` endpoint.
#[derive(Debug)]
pub struct SamouraiBackend {
    name: String,
    config: SamouraiConfig,
    client: reqwest::Client,
    tokens: Mutex<Option<Tokens>>,
}

impl SamouraiBackend {
    /// Create a backend for the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(name: impl Into<String>, config: SamouraiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            name: name.into(),
            config,
            client,
            tokens: Mutex::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.url.trim_end_matches('/'))
    }

    async fn login(&self, api_key: &str) -> Result<Tokens, reqwest::Error> {
        let response: AuthResponse = self
            .client
            .post(self.endpoint("auth/login"))
            .query(&[("apikey", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Tokens {
            access: response.authorizations.access_token,
            refresh: response.authorizations.refresh_token,
            obtained_at: Instant::now(),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Tokens, reqwest::Error> {
        let response: AuthResponse = self
            .client
            .post(self.endpoint("auth/refresh"))
            .query(&[("rt", refresh_token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Tokens {
            access: response.authorizations.access_token,
            refresh: Some(refresh_token.to_owned()),
            obtained_at: Instant::now(),
        })
    }

    /// Current access token, authenticating or refreshing as needed.
    ///
    /// Returns `None` when no API key is configured or authentication fails;
    /// the push is then attempted without a token.
    async fn access_token(&self) -> Option<String> {
        let api_key = self.config.api_key.as_deref()?;
        let mut tokens = self.tokens.lock().await;

        if let Some(current) = tokens.as_ref()
            && current.obtained_at.elapsed() < TOKEN_REFRESH_INTERVAL
        {
            return Some(current.access.clone());
        }

        let refresh_token = tokens.as_ref().and_then(|t| t.refresh.clone());
        let renewed = match refresh_token {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(renewed) => Ok(renewed),
                Err(err) => {
                    warn!("failed to refresh access token: backend={}, error={err}", self.name);
                    self.login(api_key).await
                }
            },
            None => self.login(api_key).await,
        };

        match renewed {
            Ok(renewed) => {
                info!("authenticated to backend: backend={}", self.name);
                let access = renewed.access.clone();
                *tokens = Some(renewed);
                Some(access)
            }
            Err(err) => {
                error!("failed to authenticate: backend={}, error={err}", self.name);
                *tokens = None;
                None
            }
        }
    }

    async fn submit(&self, raw_tx: &str) -> Result<PushResponse, reqwest::Error> {
        let mut form = vec![("tx", raw_tx.to_owned())];
        if let Some(token) = self.access_token().await {
            form.push(("at", token));
        }
        self.client
            .post(self.endpoint("pushtx/"))
            .form(&form)
            .send()
            .await?
            .json()
            .await
    }
}

#[async_trait]
impl PushBackend for SamouraiBackend {
    fn name(&self) -> &str { &self.name }

    async fn push(&self, raw_tx: &str) -> bool {
        info!("trying to push transaction: backend={}", self.name);
        match self.submit(raw_tx).await {
            Ok(response) if response.status == "ok" => {
                info!(
                    "pushed transaction: backend={}, data={:?}",
                    self.name, response.data
                );
                true
            }
            Ok(response) => {
                let (message, code) = response
                    .error
                    .map_or((String::new(), None), |e| (e.message, e.code));
                error!(
                    "backend rejected transaction: backend={}, code={code:?}, message={message}",
                    self.name
                );
                false
            }
            Err(err) => {
                error!("failed to reach backend: backend={}, error={err}", self.name);
                false
            }
        }
    }
}
