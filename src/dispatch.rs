//! Outbound HTTP delivery of resolved documents.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

/// How the `Authorization` header is built from the stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
	/// `Basic <base64(key)>`. The key is encoded as-is, it is not split into
	/// a user and a password.
	Basic,
	/// `Bearer <key>`.
	#[default]
	Bearer,
}

impl AuthType {
	/// Read a stored setting. Only `basic` selects [`AuthType::Basic`].
	#[must_use]
	pub fn parse(s: &str) -> Self {
		if s.trim() == "basic" { Self::Basic } else { Self::Bearer }
	}

	/// Setting value for this auth type.
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Basic => "basic",
			Self::Bearer => "bearer",
		}
	}
}

/// HTTP method used for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
	/// `POST`
	#[default]
	Post,
	/// `GET`, still carrying the JSON body.
	Get,
}

impl Method {
	/// Read a stored setting. `GET` in any case selects [`Method::Get`],
	/// everything else falls back to `POST`.
	#[must_use]
	pub fn parse(s: &str) -> Self {
		if s.trim().eq_ignore_ascii_case("get") { Self::Get } else { Self::Post }
	}

	fn as_reqwest(self) -> reqwest::Method {
		match self {
			Self::Post => reqwest::Method::POST,
			Self::Get => reqwest::Method::GET,
		}
	}
}

/// Build the `Authorization` header value for `key`.
#[must_use]
pub fn authorization_header(auth_type: AuthType, key: &str) -> String {
	match auth_type {
		AuthType::Basic => format!("Basic {}", STANDARD.encode(key)),
		AuthType::Bearer => format!("Bearer {key}"),
	}
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
	/// Whole-request timeout. Default: 30 seconds.
	pub timeout: Duration,
	/// `User-Agent` sent with every request.
	pub user_agent: String,
}

impl Default for DispatchConfig {
	fn default() -> Self {
		Self {
			timeout: Duration::from_secs(30),
			user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
		}
	}
}

impl DispatchConfig {
	/// Create a config with default values.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the request timeout.
	#[must_use]
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Set the `User-Agent`.
	#[must_use]
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();
		self
	}
}

/// What the remote API answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSummary {
	/// HTTP status code.
	pub status: u16,
	/// Response body as text.
	pub body: String,
}

/// Result of a dispatch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
	/// No URL was configured, nothing was sent.
	Skipped,
	/// The request was sent and a response received.
	Sent(ResponseSummary),
}

/// Error raised while delivering a document.
#[derive(Debug)]
pub enum DispatchError {
	/// The HTTP client could not be built.
	Client(reqwest::Error),
	/// The request could not be sent or no response arrived in time.
	Transport(reqwest::Error),
	/// The response body could not be read.
	Body(reqwest::Error),
	/// The document could not be serialized.
	Serialize(serde_json::Error),
}

impl std::fmt::Display for DispatchError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Client(e) => write!(f, "HTTP client error: {e}"),
			Self::Transport(e) => write!(f, "{e}"),
			Self::Body(e) => write!(f, "failed to read response body: {e}"),
			Self::Serialize(e) => write!(f, "failed to serialize body: {e}"),
		}
	}
}

impl std::error::Error for DispatchError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Client(e) | Self::Transport(e) | Self::Body(e) => Some(e),
			Self::Serialize(e) => Some(e),
		}
	}
}

/// Sends one request per call. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct Dispatcher {
	client: reqwest::Client,
}

impl Dispatcher {
	/// Build a dispatcher with its own HTTP client.
	///
	/// # Errors
	///
	/// Returns [`DispatchError::Client`] if the TLS backend cannot be initialized.
	pub fn new(config: &DispatchConfig) -> Result<Self, DispatchError> {
		let client = reqwest::Client::builder()
			.timeout(config.timeout)
			.user_agent(config.user_agent.as_str())
			.build()
			.map_err(DispatchError::Client)?;
		Ok(Self { client })
	}

	/// Send `body` to `url`.
	///
	/// An empty `url` returns [`Dispatched::Skipped`] without touching the
	/// network. Any HTTP status counts as a response; only transport failures
	/// are errors. Nothing is retried.
	///
	/// # Errors
	///
	/// Returns [`DispatchError`] when the request cannot be completed.
	pub async fn dispatch(
		&self,
		url: &str,
		method: Method,
		auth_type: AuthType,
		auth_key: &str,
		body: &Value,
	) -> Result<Dispatched, DispatchError> {
		let url = url.trim();
		if url.is_empty() {
			return Ok(Dispatched::Skipped);
		}

		let payload = serde_json::to_string(body).map_err(DispatchError::Serialize)?;

		tracing::trace!(%url, method = ?method, auth = auth_type.as_str(), "sending request");

		let resp = self
			.client
			.request(method.as_reqwest(), url)
			.header(CONTENT_TYPE, "application/json")
			.header(AUTHORIZATION, authorization_header(auth_type, auth_key))
			.body(payload)
			.send()
			.await
			.map_err(DispatchError::Transport)?;

		let status = resp.status().as_u16();
		let body = resp.text().await.map_err(DispatchError::Body)?;

		Ok(Dispatched::Sent(ResponseSummary { status, body }))
	}
}
