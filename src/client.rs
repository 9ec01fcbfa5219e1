//! Translation clients driven by the retry orchestrator.

use crate::config::ProxyPoolConfig;
use crate::error::{AttemptFailure, ClientError};

use anyhow::anyhow;
use async_trait::async_trait;
use http::StatusCode;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A successful translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// The translated text.
    #[serde(rename = "data")]
    pub text: String,
    /// Alternative translations, if the backend offers any.
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl Translation {
    /// Translation with no alternatives.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alternatives: Vec::new(),
        }
    }
}

/// Performs one translation attempt through one proxy.
///
/// Implementations classify their own failures: a failure blamed on the proxy
/// is `HardProxyFailure`, everything else is `SoftFailure`.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    async fn attempt(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        proxy_address: &str,
    ) -> Result<Translation, AttemptFailure>;
}

#[async_trait]
impl<T: TranslationClient + ?Sized> TranslationClient for Arc<T> {
    async fn attempt(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        proxy_address: &str,
    ) -> Result<Translation, AttemptFailure> {
        (**self).attempt(text, source_lang, target_lang, proxy_address).await
    }
}

#[derive(Serialize)]
struct TranslatePayload<'a> {
    text: &'a str,
    source_lang: &'a str,
    target_lang: &'a str,
}

/// Client for DeepLX-compatible `POST /translate` endpoints.
#[derive(Debug, Clone)]
pub struct DeepLxClient {
    endpoint: Url,
    timeout: Duration,
}

impl DeepLxClient {
    /// Create a client posting to `endpoint`, bounding each attempt by `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            timeout,
        })
    }

    /// Create a client from the endpoint and attempt timeout in the configuration.
    pub fn from_config(config: &ProxyPoolConfig) -> Result<Self, ClientError> {
        Self::new(&config.endpoint, config.attempt_timeout)
    }

    /// The translation endpoint every attempt is sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TranslationClient for DeepLxClient {
    async fn attempt(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        proxy_address: &str,
    ) -> Result<Translation, AttemptFailure> {
        let proxy = reqwest::Proxy::all(proxy_address).map_err(AttemptFailure::hard)?;

        // A client is bound to its proxy at build time.
        let client = reqwest::Client::builder()
            .proxy(proxy)
            .timeout(self.timeout)
            .build()
            .map_err(AttemptFailure::hard)?;

        let payload = TranslatePayload {
            text,
            source_lang,
            target_lang,
        };

        let response = client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!("Failed to read {} response body via {}: {}", status, proxy_address, err);
                    String::new()
                }
            };
            return Err(classify_status(status, body));
        }

        // Read errors are transient. Only a complete body that fails to parse counts against the proxy.
        let body = response.bytes().await.map_err(AttemptFailure::soft)?;
        serde_json::from_slice::<Translation>(&body).map_err(AttemptFailure::hard)
    }
}

/// Map a transport error raised before a response arrived onto hard or soft failure.
pub fn classify_error(err: reqwest::Error) -> AttemptFailure {
    if err.is_timeout() {
        AttemptFailure::soft(err)
    } else if err.is_connect() || err.is_builder() {
        AttemptFailure::hard(err)
    } else {
        AttemptFailure::soft(err)
    }
}

/// Map a non-success HTTP status onto hard or soft failure.
pub fn classify_status(status: StatusCode, body: String) -> AttemptFailure {
    let cause = anyhow!("upstream returned {}: {}", status, body);
    if status == StatusCode::PROXY_AUTHENTICATION_REQUIRED {
        AttemptFailure::HardProxyFailure { cause }
    } else {
        AttemptFailure::SoftFailure { cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_from_backend_json() {
        let t: Translation =
            serde_json::from_str(r#"{"code":200,"data":"Hallo","alternatives":["Servus"]}"#).unwrap();
        assert_eq!(t.text, "Hallo");
        assert_eq!(t.alternatives, vec!["Servus"]);

        let t: Translation = serde_json::from_str(r#"{"data":"Hallo"}"#).unwrap();
        assert!(t.alternatives.is_empty());
    }

    #[test]
    fn test_proxy_auth_status_is_hard() {
        assert!(classify_status(StatusCode::PROXY_AUTHENTICATION_REQUIRED, String::new()).is_hard());
        assert!(!classify_status(StatusCode::TOO_MANY_REQUESTS, String::new()).is_hard());
        assert!(!classify_status(StatusCode::SERVICE_UNAVAILABLE, "busy".into()).is_hard());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let err = DeepLxClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_config_uses_endpoint() {
        let config = ProxyPoolConfig::builder().build();
        let client = DeepLxClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint().as_str(), crate::config::DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_unparseable_proxy_is_hard() {
        let client = DeepLxClient::new("http://127.0.0.1:9/translate", Duration::from_secs(1)).unwrap();
        let err = client.attempt("hi", "auto", "de", "http://[not-a-proxy").await.unwrap_err();
        assert!(err.is_hard());
    }
}
