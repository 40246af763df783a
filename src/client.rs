//! Signed request invoker.
//!
//! A request is built exactly once: the caller's object gets `apikey`
//! injected, is serialized to compact JSON, and that single buffer is both
//! signed and sent as the body. Nothing re-encodes the payload after
//! signing.

use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::core::{Credentials, Error, Result};
use crate::signer::{HmacSigner, Signer};

/// Bound on connecting and on each wait for response data.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

/// Header carrying the hex HMAC-SHA256 of the body.
pub const SIGNATURE_HEADER: &str = "HMAC2";

/// Body field the API key is injected under.
pub const APIKEY_FIELD: &str = "apikey";

const USER_AGENT: &str = concat!("shadow-call/", env!("CARGO_PKG_VERSION"));

/// Target URL, body bytes and the signature computed over those bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub url: String,
    pub body: Vec<u8>,
    pub signature: String,
}

/// Build the signed envelope for `method` without touching the network.
pub fn sign_request(credentials: &Credentials, method: &str, payload: &Value) -> Result<SignedEnvelope> {
    if method.is_empty() {
        return Err(Error::Payload("method must not be empty".to_string()));
    }

    let mut request = payload
        .as_object()
        .ok_or_else(|| {
            Error::Payload(format!("request must be a JSON object, got {}", json_type(payload)))
        })?
        .clone();
    request.insert(APIKEY_FIELD.to_string(), Value::String(credentials.key().to_string()));

    let body = serde_json::to_vec(&request)?;
    let signature = HmacSigner::new(credentials.secret().as_bytes()).sign(&body)?;

    Ok(SignedEnvelope {
        url: format!("{}{}", credentials.base_uri(), method),
        body,
        signature,
    })
}

/// Parse command-line request text into a JSON object.
pub fn parse_request(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Payload(format!(
            "request must be a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connect timeout, and idle timeout for each read
    pub timeout: Duration,
    /// Custom user agent
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Client bound to one set of credentials.
pub struct ApiClient {
    http: Client,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .user_agent(config.user_agent.as_deref().unwrap_or(USER_AGENT))
            .build()?;

        Ok(Self { http, credentials })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn prepare(&self, method: &str, payload: &Value) -> Result<SignedEnvelope> {
        sign_request(&self.credentials, method, payload)
    }

    /// POST the signed payload to `base_uri + method` and return the raw
    /// response body. The HTTP status is not inspected.
    pub async fn invoke(&self, method: &str, payload: &Value) -> Result<Vec<u8>> {
        let envelope = self.prepare(method, payload)?;
        tracing::debug!(url = %envelope.url, bytes = envelope.body.len(), "Sending signed request");

        let resp = self
            .http
            .post(&envelope.url)
            .header(SIGNATURE_HEADER, envelope.signature.as_str())
            .body(envelope.body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!("{} -> HTTP {}", method, status);
        } else {
            tracing::warn!("{} -> HTTP {}, passing body through", method, status);
        }

        let body = resp.bytes().await?;
        Ok(body.to_vec())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_uri", &self.credentials.base_uri())
            .finish()
    }
}

/// One-shot call: sign `payload`, send it to `method`, return the body.
pub async fn invoke(credentials: &Credentials, method: &str, payload: &Value) -> Result<Vec<u8>> {
    ApiClient::new(credentials.clone())?.invoke(method, payload).await
}
