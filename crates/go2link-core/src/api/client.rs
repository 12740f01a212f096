//! HTTP client for the robot cloud service.
//!
//! GET bodies travel as query parameters, POST bodies form-encoded. The
//! access token is carried in a configurable header and is sent empty on
//! the public endpoints (login, public key).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

use super::{ApiError, RequestSigner};

/// Envelope code the service uses for success
pub const SUCCESS_CODE: i64 = 100;

/// Endpoints that accept an empty token
const PUBLIC_PATHS: &[&str] = &["login/email", "system/pubKey"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    pub code: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default, alias = "errorMsg", alias = "msg")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Turn a non-success envelope into `ApiError::RemoteService`
    pub fn into_success(self, path: &str) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::RemoteService {
                path: path.to_string(),
                code: self.code,
                message: self.message.unwrap_or_default(),
            })
        }
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path.trim_start_matches('/'))
}

/// Outbound access to the remote identity/session service.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Send one request and return the envelope whatever its code.
    async fn send(
        &self,
        path: &str,
        body: &[(&str, &str)],
        token: Option<&str>,
        method: Method,
    ) -> Result<ResponseEnvelope, ApiError>;

    /// Send one request, requiring a token on non-public endpoints and
    /// mapping non-success codes to `ApiError::RemoteService`.
    async fn call(
        &self,
        path: &str,
        body: &[(&str, &str)],
        token: Option<&str>,
        method: Method,
    ) -> Result<ResponseEnvelope, ApiError> {
        if token.map_or(true, str::is_empty) && !is_public_path(path) {
            return Err(ApiError::MissingToken(path.to_string()));
        }
        let envelope = self.send(path, body, token, method).await?;
        if !envelope.is_success() {
            warn!(path = path, code = envelope.code, "Remote service rejected request");
        }
        envelope.into_success(path)
    }
}

/// API client for the robot cloud service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token_header: HeaderName,
    base_headers: HeaderMap,
    signer: Option<RequestSigner>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let token_header = HeaderName::from_bytes(config.token_header.as_bytes())
            .map_err(|e| ApiError::InvalidRequest(format!("token header: {}", e)))?;

        let mut base_headers = HeaderMap::new();
        for (name, value) in &config.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("header {}: {}", name, e)))?;
            base_headers.insert(name, value);
        }

        let signer = config
            .app_sign_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(RequestSigner::new);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_header,
            base_headers,
            signer,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn headers(&self, token: Option<&str>) -> Result<HeaderMap, ApiError> {
        let mut headers = self.base_headers.clone();

        let mut value = HeaderValue::from_str(token.unwrap_or(""))
            .map_err(|_| ApiError::InvalidRequest("token is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        headers.insert(self.token_header.clone(), value);

        if let Some(ref signer) = self.signer {
            signer.sign().apply(&mut headers);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl RemoteApi for ApiClient {
    async fn send(
        &self,
        path: &str,
        body: &[(&str, &str)],
        token: Option<&str>,
        method: Method,
    ) -> Result<ResponseEnvelope, ApiError> {
        let url = self.url(path);
        let request = match method {
            Method::Get => self.client.get(&url).query(body),
            Method::Post => self.client.post(&url).form(body),
        };

        debug!(path = path, method = ?method, "Sending request");
        let response = request.headers(self.headers(token)?).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let envelope: ResponseEnvelope = serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("{}: {}", e, ApiError::truncate_body(&text)))
        })?;
        debug!(path = path, code = envelope.code, "Received response");
        Ok(envelope)
    }
}
