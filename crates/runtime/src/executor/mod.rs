//! Command execution over HTTP.
//!
//! [`HttpExecutor`] routes a [`Command`] to a request, sends it, and classifies
//! the response. The classification rule is applied to every response on its
//! own: a body is W3C-shaped when its `value` is an object and it has no
//! `status` field; anything else with a numeric non-zero `status` is a legacy
//! error. The executor's [`is_w3c`](HttpExecutor::is_w3c) flag is only set
//! from new-session responses and is informational.

use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace};

use crate::command::{Command, CommandName};
use crate::error::{Error, ErrorKind, Result, check_legacy_response, decode_error};
use crate::http::{HttpClient, Method, Response};
use crate::router::{self, CustomCommands, Route};
use crate::session::Session;

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResponse {
	/// Returned for new-session commands.
	Session(Session),
	/// Raw wire value for every other command.
	Value(Value),
}

impl CommandResponse {
	/// Returns the wire value. A session becomes its id.
	pub fn into_value(self) -> Value {
		match self {
			CommandResponse::Session(session) => Value::String(session.id().to_string()),
			CommandResponse::Value(value) => value,
		}
	}

	/// Returns the session, failing if the response carried a plain value.
	pub fn into_session(self) -> Result<Session> {
		match self {
			CommandResponse::Session(session) => Ok(session),
			CommandResponse::Value(value) => Err(Error::unknown(format!("Expected a new session response, got: {value}"))),
		}
	}
}

/// Boxed future returned by [`CommandExecutor::execute`].
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandResponse>> + Send + 'a>>;

/// Executes commands against a remote end.
///
/// Implementations do not serialize concurrent calls. Most remote ends expect
/// one command in flight per session, so callers issuing commands concurrently
/// on one session must order them themselves.
pub trait CommandExecutor: Send + Sync {
	fn execute(&self, command: Command) -> ExecuteFuture<'_>;
}

type ClientFuture = Shared<BoxFuture<'static, Result<HttpClient>>>;

/// [`CommandExecutor`] speaking JSON over HTTP.
pub struct HttpExecutor {
	resolved: OnceLock<HttpClient>,
	pending: ClientFuture,
	custom: RwLock<CustomCommands>,
	w3c: AtomicBool,
}

impl std::fmt::Debug for HttpExecutor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HttpExecutor")
			.field("client", &self.resolved.get())
			.field("custom", &*self.custom.read())
			.field("w3c", &self.is_w3c())
			.finish()
	}
}

impl HttpExecutor {
	/// Creates an executor around a ready client.
	pub fn new(client: HttpClient) -> Self {
		let resolved = OnceLock::new();
		let _ = resolved.set(client.clone());
		Self {
			resolved,
			pending: futures_util::future::ready(Ok::<_, Error>(client)).boxed().shared(),
			custom: RwLock::new(CustomCommands::new()),
			w3c: AtomicBool::new(false),
		}
	}

	/// Creates an executor whose client is still being prepared, e.g. while a
	/// driver service starts. The client is awaited on first use and cached.
	pub fn deferred<F>(client: F) -> Self
	where
		F: Future<Output = Result<HttpClient>> + Send + 'static,
	{
		Self {
			resolved: OnceLock::new(),
			pending: client.boxed().shared(),
			custom: RwLock::new(CustomCommands::new()),
			w3c: AtomicBool::new(false),
		}
	}

	/// Registers an extension command. Custom routes take precedence over
	/// standard ones.
	pub fn define_command(&self, name: impl Into<String>, method: Method, path: impl Into<String>) {
		self.custom.write().insert(name.into(), Route::new(method, path));
	}

	/// Whether a new-session response from this endpoint was W3C-shaped.
	pub fn is_w3c(&self) -> bool {
		self.w3c.load(Ordering::SeqCst)
	}

	async fn client(&self) -> Result<HttpClient> {
		if let Some(client) = self.resolved.get() {
			return Ok(client.clone());
		}
		let client = self.pending.clone().await?;
		let _ = self.resolved.set(client.clone());
		Ok(client)
	}

	async fn execute_command(&self, command: Command) -> Result<CommandResponse> {
		let name = command.name().clone();
		let request = {
			let custom = self.custom.read();
			router::build_request(&custom, command)?
		};
		debug!(target: "wd::executor", ">>> {} {}", request.method, request.path);

		let client = self.client().await?;
		let response = client.send(&request).await?;
		trace!(target: "wd::executor", ">>>\n{}\n<<<\n{}", request, response);

		let (is_w3c, value) = parse_http_response(&name, &response)?;

		if name != CommandName::NewSession {
			return Ok(CommandResponse::Value(value));
		}

		let session_id = match value.get("sessionId") {
			Some(Value::String(id)) if !id.is_empty() => id.clone(),
			Some(Value::Number(id)) => id.to_string(),
			_ => {
				return Err(Error::unknown(format!(
					"Unable to parse new session response: {}",
					response.body
				)));
			}
		};

		self.w3c.fetch_or(is_w3c, Ordering::SeqCst);

		let capabilities = value
			.get("capabilities")
			.filter(|caps| !caps.is_null())
			.or_else(|| value.get("value"))
			.cloned()
			.unwrap_or(Value::Null);
		Ok(CommandResponse::Session(Session::new(session_id, capabilities)))
	}
}

impl CommandExecutor for HttpExecutor {
	fn execute(&self, command: Command) -> ExecuteFuture<'_> {
		Box::pin(self.execute_command(command))
	}
}

/// Classifies a raw response, returning whether it was W3C-shaped and the
/// result value.
///
/// Legacy new-session responses yield the entire body so both dialects expose
/// `sessionId` at the top level.
pub fn parse_http_response(command: &CommandName, response: &Response) -> Result<(bool, Value)> {
	if response.status < 200 {
		return Err(Error::unknown(format!("Unexpected HTTP response:\n{response}")));
	}

	match serde_json::from_str::<Value>(&response.body) {
		Ok(parsed @ (Value::Object(_) | Value::Array(_))) => {
			let mut value = parsed.get("value").cloned().unwrap_or(Value::Null);
			let is_w3c = value.is_object() && parsed.get("status").is_none();

			if !is_w3c {
				check_legacy_response(&parsed)?;
				if *command == CommandName::NewSession {
					value = parsed;
				}
			} else if response.status > 399 {
				return Err(decode_error(&value));
			}

			Ok((is_w3c, value))
		}
		Ok(scalar) => Ok((false, scalar)),
		Err(_) => {
			let value = response.body.replace("\r\n", "\n");

			if response.status == 404 {
				return Err(Error::webdriver(ErrorKind::UnknownCommand, format!("{command}: {value}")));
			}
			if response.status >= 400 {
				return Err(Error::unknown(value));
			}

			let value = if value.is_empty() { Value::Null } else { Value::String(value) };
			Ok((false, value))
		}
	}
}
