//! Cloudflare API client
//!
//! [`ApiClient`] sends requests through a [`Transport`] and decodes every
//! answer into a typed [`Envelope`]. Decoding happens in two steps so the two
//! failure modes stay distinct:
//!
//! - body is not JSON at all → [`Error::InvalidBody`] (fatal to the run)
//! - body is JSON of the wrong shape → [`Error::Decode`] (contained)

use async_trait::async_trait;
use cfddns_core::{Error, Result};
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::Envelope;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4/";

/// Longest body excerpt quoted in error messages
const BODY_EXCERPT_LEN: usize = 200;

/// A request relative to the API base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// A GET request without query parameters
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Authentication scheme
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// API token sent as `Authorization: Bearer`
    Token(String),
    /// Global API key with the account email (`X-Auth-Key` / `X-Auth-Email`)
    KeyEmail { key: String, email: String },
}

// Credentials never appear in Debug output
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Token(_) => f.write_str("Token(<REDACTED>)"),
            Auth::KeyEmail { email, .. } => f
                .debug_struct("KeyEmail")
                .field("key", &"<REDACTED>")
                .field("email", email)
                .finish(),
        }
    }
}

/// Sends raw requests to the provider
///
/// Implementations perform exactly one attempt per call. Any failure to get
/// a response body back is an [`Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response body
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    auth: Auth,
}

impl ReqwestTransport {
    /// Create a transport against the Cloudflare API
    pub fn new(client: reqwest::Client, auth: Auth) -> Self {
        Self::with_base_url(client, auth, CLOUDFLARE_API_BASE)
    }

    /// Create a transport against another base URL
    pub fn with_base_url(client: reqwest::Client, auth: Auth, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auth,
        }
    }

    /// Build the HTTP request with authentication and content-type headers
    pub fn build_request(&self, request: ApiRequest) -> reqwest::Result<reqwest::Request> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method, &url)
            .header(CONTENT_TYPE, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &self.auth {
            Auth::Token(token) => builder.bearer_auth(token),
            Auth::KeyEmail { key, email } => builder
                .header("X-Auth-Key", key)
                .header("X-Auth-Email", email),
        };

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        builder.build()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let request = self
            .build_request(request)
            .map_err(|e| Error::transport(format!("Error creating request: {}", e)))?;

        let method = request.method().clone();
        let url = request.url().clone();

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::transport(format!("{} {} failed: {}", method, url.path(), e)))?;

        // Cloudflare reports failures inside the JSON envelope, so the status
        // code is informational only
        tracing::debug!(status = %response.status(), "{} {}", method, url.path());

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        Ok(body.to_vec())
    }
}

/// Typed client on top of a [`Transport`]
#[derive(Debug)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Send a GET request
    pub async fn get<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<Envelope<R>> {
        self.send(request).await
    }

    /// Send a request with a JSON body
    pub async fn send_json<R, B>(&self, method: Method, path: &str, body: &B) -> Result<Envelope<R>>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        tracing::debug!(body = %String::from_utf8_lossy(&body), "{} {}", method, path);

        self.send(ApiRequest {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body),
        })
        .await
    }

    /// Send a request and decode the response envelope
    pub async fn send<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<Envelope<R>> {
        let context = format!("{} {}", request.method, request.path);
        let bytes = self.transport.send(request).await?;

        tracing::debug!(response = %String::from_utf8_lossy(&bytes), "{}", context);

        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            Error::InvalidBody(format!("{}: {} (body: {:?})", context, e, excerpt(&bytes)))
        })?;

        serde_json::from_value(value).map_err(|e| Error::decode(format!("{}: {}", context, e)))
    }
}

fn excerpt(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .take(BODY_EXCERPT_LEN)
        .collect()
}
