//! Command to HTTP request routing.
//!
//! A command is resolved against two tables: the executor's custom table
//! (vendor extension commands) first, then the standard W3C table. Standard
//! entries are either a static `{method, path}` route or a rewrite that turns
//! the command into another command, typically an execute-script call running
//! one of the [`atoms`](crate::atoms).
//!
//! Path templates use `:name` segments. Each one consumes the parameter of the
//! same name; whatever remains becomes the request body.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::trace;
use wd_protocol::reference;

use crate::atoms;
use crate::command::{Command, CommandName};
use crate::error::{Error, ErrorKind, Result};
use crate::http::{Method, Request};

/// A static route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
	pub method: Method,
	pub path: Cow<'static, str>,
}

impl Route {
	pub const fn fixed(method: Method, path: &'static str) -> Self {
		Self {
			method,
			path: Cow::Borrowed(path),
		}
	}

	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: Cow::Owned(path.into()),
		}
	}
}

/// How a command reaches the wire.
#[derive(Debug, Clone)]
pub enum CommandSpec {
	Route(Route),
	/// Re-expresses the command as a different, routable command.
	Rewrite(fn(&Command) -> Command),
}

/// Per-executor table of extension commands, keyed by command name.
pub type CustomCommands = HashMap<String, Route>;

const fn get(path: &'static str) -> CommandSpec {
	CommandSpec::Route(Route::fixed(Method::Get, path))
}

const fn post(path: &'static str) -> CommandSpec {
	CommandSpec::Route(Route::fixed(Method::Post, path))
}

const fn delete(path: &'static str) -> CommandSpec {
	CommandSpec::Route(Route::fixed(Method::Delete, path))
}

/// Looks up a command in the standard W3C table.
pub fn standard_spec(name: &CommandName) -> Option<CommandSpec> {
	use CommandName::*;

	let spec = match name {
		NewSession => post("/session"),
		Quit => delete("/session/:sessionId"),
		GetStatus => get("/status"),

		GetTimeout => get("/session/:sessionId/timeouts"),
		SetTimeout => post("/session/:sessionId/timeouts"),

		GetCurrentUrl => get("/session/:sessionId/url"),
		Get => post("/session/:sessionId/url"),
		GoBack => post("/session/:sessionId/back"),
		GoForward => post("/session/:sessionId/forward"),
		Refresh => post("/session/:sessionId/refresh"),

		GetPageSource => get("/session/:sessionId/source"),
		GetTitle => get("/session/:sessionId/title"),

		ExecuteScript => post("/session/:sessionId/execute/sync"),
		ExecuteAsyncScript => post("/session/:sessionId/execute/async"),

		SwitchToFrame => post("/session/:sessionId/frame"),
		SwitchToFrameParent => post("/session/:sessionId/frame/parent"),

		GetCurrentWindowHandle => get("/session/:sessionId/window"),
		Close => delete("/session/:sessionId/window"),
		SwitchToWindow => post("/session/:sessionId/window"),
		SwitchToNewWindow => post("/session/:sessionId/window/new"),
		GetWindowHandles => get("/session/:sessionId/window/handles"),
		GetWindowRect => get("/session/:sessionId/window/rect"),
		SetWindowRect => post("/session/:sessionId/window/rect"),
		MaximizeWindow => post("/session/:sessionId/window/maximize"),
		MinimizeWindow => post("/session/:sessionId/window/minimize"),
		FullscreenWindow => post("/session/:sessionId/window/fullscreen"),

		Actions => post("/session/:sessionId/actions"),
		ClearActions => delete("/session/:sessionId/actions"),
		PrintPage => post("/session/:sessionId/print"),

		GetActiveElement => get("/session/:sessionId/element/active"),
		FindElement => post("/session/:sessionId/element"),
		FindElements => post("/session/:sessionId/elements"),
		FindElementsRelative => CommandSpec::Rewrite(find_elements_relative),
		FindChildElement => post("/session/:sessionId/element/:id/element"),
		FindChildElements => post("/session/:sessionId/element/:id/elements"),

		GetElementTagName => get("/session/:sessionId/element/:id/name"),
		GetDomAttribute => get("/session/:sessionId/element/:id/attribute/:name"),
		GetElementAttribute => CommandSpec::Rewrite(get_element_attribute),
		GetElementProperty => get("/session/:sessionId/element/:id/property/:name"),
		GetElementValueOfCssProperty => get("/session/:sessionId/element/:id/css/:propertyName"),
		GetElementRect => get("/session/:sessionId/element/:id/rect"),
		ClearElement => post("/session/:sessionId/element/:id/clear"),
		ClickElement => post("/session/:sessionId/element/:id/click"),
		SendKeysToElement => post("/session/:sessionId/element/:id/value"),
		GetElementText => get("/session/:sessionId/element/:id/text"),
		GetComputedRole => get("/session/:sessionId/element/:id/computedrole"),
		GetComputedLabel => get("/session/:sessionId/element/:id/computedlabel"),
		IsElementEnabled => get("/session/:sessionId/element/:id/enabled"),
		IsElementSelected => get("/session/:sessionId/element/:id/selected"),
		IsElementDisplayed => CommandSpec::Rewrite(is_element_displayed),

		GetAllCookies => get("/session/:sessionId/cookie"),
		AddCookie => post("/session/:sessionId/cookie"),
		DeleteAllCookies => delete("/session/:sessionId/cookie"),
		GetCookie => get("/session/:sessionId/cookie/:name"),
		DeleteCookie => delete("/session/:sessionId/cookie/:name"),

		AcceptAlert => post("/session/:sessionId/alert/accept"),
		DismissAlert => post("/session/:sessionId/alert/dismiss"),
		GetAlertText => get("/session/:sessionId/alert/text"),
		SetAlertText => post("/session/:sessionId/alert/text"),

		Screenshot => get("/session/:sessionId/screenshot"),
		TakeElementScreenshot => get("/session/:sessionId/element/:id/screenshot"),

		GetShadowRoot => get("/session/:sessionId/element/:id/shadow"),
		FindElementFromShadowRoot => post("/session/:sessionId/shadow/:id/element"),
		FindElementsFromShadowRoot => post("/session/:sessionId/shadow/:id/elements"),

		GetLog => post("/session/:sessionId/se/log"),
		GetAvailableLogTypes => get("/session/:sessionId/se/log/types"),

		UploadFile => post("/session/:sessionId/se/file"),

		AddVirtualAuthenticator => post("/session/:sessionId/webauthn/authenticator"),
		RemoveVirtualAuthenticator => delete("/session/:sessionId/webauthn/authenticator/:authenticatorId"),
		AddCredential => post("/session/:sessionId/webauthn/authenticator/:authenticatorId/credential"),
		GetCredentials => get("/session/:sessionId/webauthn/authenticator/:authenticatorId/credentials"),
		RemoveCredential => delete("/session/:sessionId/webauthn/authenticator/:authenticatorId/credentials/:credentialId"),
		RemoveAllCredentials => delete("/session/:sessionId/webauthn/authenticator/:authenticatorId/credentials"),
		SetUserVerified => post("/session/:sessionId/webauthn/authenticator/:authenticatorId/uv"),

		GetSessions | Custom(_) => return None,
	};
	Some(spec)
}

fn find_elements_relative(command: &Command) -> Command {
	to_execute_atom(command, atoms::FIND_ELEMENTS, &["args"])
}

fn get_element_attribute(command: &Command) -> Command {
	to_execute_atom(command, atoms::GET_ATTRIBUTE, &["id", "name"])
}

fn is_element_displayed(command: &Command) -> Command {
	to_execute_atom(command, atoms::IS_DISPLAYED, &["id"])
}

/// Rewrites `command` as an execute-script call of `atom`, forwarding `params` as arguments.
fn to_execute_atom(command: &Command, atom: &str, params: &[&str]) -> Command {
	let args: Vec<Value> = params
		.iter()
		.map(|param| command.parameter(param).cloned().unwrap_or(Value::Null))
		.collect();

	Command::new(CommandName::ExecuteScript)
		.with_parameter("sessionId", command.parameter("sessionId").cloned().unwrap_or(Value::Null))
		.with_parameter("script", atoms::script_for(atom))
		.with_parameter("args", args)
}

/// Resolves `command` to an HTTP request.
///
/// Fails with [`ErrorKind::UnknownCommand`] when neither table knows the
/// command, and with [`ErrorKind::InvalidArgument`] when a path parameter is
/// missing.
pub fn build_request(custom: &CustomCommands, command: Command) -> Result<Request> {
	let mut command = command;
	trace!(target: "wd::router", command = %command.name(), "translating command");

	loop {
		if let Some(route) = custom.get(command.name().as_str()) {
			return to_http_request(route, command);
		}

		match standard_spec(command.name()) {
			Some(CommandSpec::Rewrite(rewrite)) => {
				trace!(target: "wd::router", command = %command.name(), "rewriting command");
				command = rewrite(&command);
			}
			Some(CommandSpec::Route(route)) => return to_http_request(&route, command),
			None => {
				return Err(Error::webdriver(
					ErrorKind::UnknownCommand,
					format!("Unrecognized command: {}", command.name()),
				));
			}
		}
	}
}

fn to_http_request(route: &Route, command: Command) -> Result<Request> {
	let (_, mut parameters) = command.into_parts();
	let path = build_path(&route.path, &mut parameters)?;
	Ok(Request::new(route.method, path, Value::Object(parameters)))
}

/// Substitutes `:name` segments of `template` with parameters, removing each
/// consumed parameter from `parameters`.
///
/// Element and shadow-root references contribute only their id.
pub fn build_path(template: &str, parameters: &mut Map<String, Value>) -> Result<String> {
	let mut path = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(start) = rest.find("/:") {
		path.push_str(&rest[..start]);
		let after = &rest[start + 2..];
		let len = after
			.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
			.unwrap_or(after.len());
		let key = &after[..len];

		if key.is_empty() {
			path.push_str("/:");
			rest = after;
			continue;
		}

		let value = parameters
			.remove(key)
			.ok_or_else(|| Error::invalid_argument(format!("Missing required parameter: {key}")))?;
		path.push('/');
		path.push_str(&path_segment(&value));
		rest = &after[len..];
	}

	path.push_str(rest);
	Ok(path)
}

fn path_segment(value: &Value) -> String {
	if let Some(id) = reference::handle_id(value) {
		return id.to_string();
	}
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
