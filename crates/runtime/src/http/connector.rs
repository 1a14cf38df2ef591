//! Single HTTP exchanges.
//!
//! A [`Connector`] performs exactly one request/response round trip. It never
//! follows redirects and never retries; [`HttpClient`](super::HttpClient)
//! layers both on top.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::redirect::Policy;
use url::Url;

use super::Method;
use crate::error::{Error, Result};

/// Network error codes that are worth retrying.
pub const TRANSIENT_CODES: &[&str] = &["ECONNABORTED", "ECONNRESET", "ECONNREFUSED", "EADDRINUSE", "EPIPE", "ETIMEDOUT"];

/// A network-level failure, tagged with an errno-style code when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
	pub code: Option<String>,
	pub message: String,
}

impl NetworkError {
	pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			code: Some(code.into()),
			message: message.into(),
		}
	}

	/// A failure with no recognizable code. Never retried.
	pub fn other(message: impl Into<String>) -> Self {
		Self {
			code: None,
			message: message.into(),
		}
	}

	/// Returns true if the failure is one of [`TRANSIENT_CODES`].
	pub fn is_transient(&self) -> bool {
		self.code.as_deref().is_some_and(|code| TRANSIENT_CODES.contains(&code))
	}
}

impl fmt::Display for NetworkError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.code {
			Some(code) => write!(f, "{} {}", code, self.message),
			None => f.write_str(&self.message),
		}
	}
}

impl StdError for NetworkError {}

/// Fully resolved request as it goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
	pub method: Method,
	pub url: Url,
	pub headers: Vec<(String, String)>,
	pub body: Option<String>,
}

impl WireRequest {
	/// Returns the first header named `name`, case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		find_header(&self.headers, name)
	}
}

/// Raw response before redirect handling.
#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
	pub status: u16,
	/// Header names are lower-cased.
	pub headers: Vec<(String, String)>,
	pub body: String,
}

impl WireResponse {
	pub fn header(&self, name: &str) -> Option<&str> {
		find_header(&self.headers, name)
	}
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
	headers
		.iter()
		.find(|(key, _)| key.eq_ignore_ascii_case(name))
		.map(|(_, value)| value.as_str())
}

/// Boxed future returned by [`Connector::exchange`].
pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = std::result::Result<WireResponse, NetworkError>> + Send + 'a>>;

/// Performs one HTTP exchange.
pub trait Connector: Send + Sync {
	fn exchange(&self, request: WireRequest) -> ExchangeFuture<'_>;
}

/// [`Connector`] backed by a `reqwest` client.
///
/// Redirects are disabled so the caller sees 302/303 responses. Environment
/// proxies are ignored; an explicit proxy URL may carry `user:pass@`
/// credentials, sent as `Proxy-Authorization: Basic`.
#[derive(Debug, Clone)]
pub struct ReqwestConnector {
	client: reqwest::Client,
}

impl ReqwestConnector {
	pub fn new(keep_alive: bool, proxy: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
		let mut builder = reqwest::Client::builder().redirect(Policy::none()).no_proxy();

		if !keep_alive {
			builder = builder.pool_max_idle_per_host(0);
		}
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		if let Some(proxy) = proxy {
			let proxy_url = Url::parse(proxy).map_err(|e| Error::InvalidUrl(format!("{proxy}: {e}")))?;
			let mut reqwest_proxy = reqwest::Proxy::all(proxy_url.as_str())
				.map_err(|e| Error::InvalidUrl(format!("{proxy}: {e}")))?;
			if !proxy_url.username().is_empty() {
				reqwest_proxy = reqwest_proxy.basic_auth(proxy_url.username(), proxy_url.password().unwrap_or_default());
			}
			builder = builder.proxy(reqwest_proxy);
		}

		let client = builder
			.build()
			.map_err(|e| Error::Network(NetworkError::other(format!("Failed to build HTTP client: {e}"))))?;
		Ok(Self { client })
	}

	async fn send(&self, request: WireRequest) -> std::result::Result<WireResponse, NetworkError> {
		let mut builder = self.client.request(request.method.into(), request.url);
		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await.map_err(classify)?;
		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.map(|(name, value)| {
				(
					name.as_str().to_ascii_lowercase(),
					String::from_utf8_lossy(value.as_bytes()).into_owned(),
				)
			})
			.collect();
		let bytes = response.bytes().await.map_err(classify)?;

		Ok(WireResponse {
			status,
			headers,
			body: String::from_utf8_lossy(&bytes).into_owned(),
		})
	}
}

impl Connector for ReqwestConnector {
	fn exchange(&self, request: WireRequest) -> ExchangeFuture<'_> {
		Box::pin(self.send(request))
	}
}

impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Maps a `reqwest` failure onto an errno-style code.
fn classify(err: reqwest::Error) -> NetworkError {
	let message = err.to_string();

	let mut source: Option<&(dyn StdError + 'static)> = err.source();
	while let Some(cause) = source {
		if let Some(io) = cause.downcast_ref::<std::io::Error>() {
			if let Some(code) = io_code(io.kind()) {
				return NetworkError::new(code, message);
			}
		}
		if cause.to_string().starts_with("dns error") {
			return NetworkError::new("ENOTFOUND", message);
		}
		source = cause.source();
	}

	// connect failures without a recognised io kind (TLS, proxy) are not retried
	if err.is_timeout() {
		NetworkError::new("ETIMEDOUT", message)
	} else {
		NetworkError::other(message)
	}
}

fn io_code(kind: std::io::ErrorKind) -> Option<&'static str> {
	use std::io::ErrorKind;

	let code = match kind {
		ErrorKind::ConnectionAborted => "ECONNABORTED",
		ErrorKind::ConnectionReset => "ECONNRESET",
		ErrorKind::ConnectionRefused => "ECONNREFUSED",
		ErrorKind::AddrInUse => "EADDRINUSE",
		ErrorKind::BrokenPipe => "EPIPE",
		ErrorKind::TimedOut => "ETIMEDOUT",
		ErrorKind::NotConnected => "ENOTCONN",
		ErrorKind::AddrNotAvailable => "EADDRNOTAVAIL",
		_ => return None,
	};
	Some(code)
}
