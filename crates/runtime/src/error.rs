//! Error types for the WebDriver runtime.
//!
//! Remote failures are reported as a [`WebDriverError`] tagged with an
//! [`ErrorKind`]. Each kind has a canonical W3C string code and, where the
//! legacy JSON Wire Protocol defined one, a numeric status. The decode
//! functions in this module turn error payloads of either dialect into an
//! [`Error`]; [`encode_error`] goes the other way for fake remote ends.

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;

use crate::http::NetworkError;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

macro_rules! error_kinds {
	($($(#[$meta:meta])* $variant:ident => ($code:literal, $name:literal, $legacy:expr),)+) => {
		/// Closed set of remote error kinds.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum ErrorKind {
			$($(#[$meta])* $variant,)+
		}

		impl ErrorKind {
			/// Every kind, in declaration order.
			pub const ALL: &'static [ErrorKind] = &[$(ErrorKind::$variant,)+];

			/// W3C error code, e.g. `"no such element"`.
			pub fn code(&self) -> &'static str {
				match self {
					$(ErrorKind::$variant => $code,)+
				}
			}

			/// Error class name, e.g. `"NoSuchElementError"`.
			pub fn name(&self) -> &'static str {
				match self {
					$(ErrorKind::$variant => $name,)+
				}
			}

			/// Canonical legacy status code, if the legacy protocol had one.
			pub fn legacy_status(&self) -> Option<i64> {
				match self {
					$(ErrorKind::$variant => $legacy,)+
				}
			}

			/// Looks up a kind by exact W3C code.
			pub fn from_code(code: &str) -> Option<ErrorKind> {
				match code {
					$($code => Some(ErrorKind::$variant),)+
					_ => None,
				}
			}
		}
	};
}

error_kinds! {
	/// Generic remote failure.
	Unknown => ("unknown error", "WebDriverError", Some(13)),
	DetachedShadowRoot => ("detached shadow root", "DetachedShadowRootError", None),
	ElementClickIntercepted => ("element click intercepted", "ElementClickInterceptedError", Some(64)),
	ElementNotInteractable => ("element not interactable", "ElementNotInteractableError", Some(60)),
	ElementNotSelectable => ("element not selectable", "ElementNotSelectableError", Some(15)),
	InsecureCertificate => ("insecure certificate", "InsecureCertificateError", None),
	InvalidArgument => ("invalid argument", "InvalidArgumentError", Some(61)),
	InvalidCookieDomain => ("invalid cookie domain", "InvalidCookieDomainError", Some(24)),
	InvalidCoordinates => ("invalid coordinates", "InvalidCoordinatesError", Some(29)),
	InvalidElementState => ("invalid element state", "InvalidElementStateError", Some(12)),
	InvalidSelector => ("invalid selector", "InvalidSelectorError", Some(32)),
	/// The session id is unknown to the remote end, or the session was quit.
	NoSuchSession => ("invalid session id", "NoSuchSessionError", Some(6)),
	JavascriptError => ("javascript error", "JavascriptError", Some(17)),
	MoveTargetOutOfBounds => ("move target out of bounds", "MoveTargetOutOfBoundsError", Some(34)),
	NoSuchAlert => ("no such alert", "NoSuchAlertError", Some(27)),
	NoSuchCookie => ("no such cookie", "NoSuchCookieError", Some(62)),
	NoSuchElement => ("no such element", "NoSuchElementError", Some(7)),
	NoSuchFrame => ("no such frame", "NoSuchFrameError", Some(8)),
	NoSuchShadowRoot => ("no such shadow root", "NoSuchShadowRootError", None),
	NoSuchWindow => ("no such window", "NoSuchWindowError", Some(23)),
	ScriptTimeout => ("script timeout", "ScriptTimeoutError", Some(28)),
	SessionNotCreated => ("session not created", "SessionNotCreatedError", Some(33)),
	StaleElementReference => ("stale element reference", "StaleElementReferenceError", Some(10)),
	Timeout => ("timeout", "TimeoutError", Some(21)),
	UnableToSetCookie => ("unable to set cookie", "UnableToSetCookieError", Some(25)),
	UnableToCaptureScreen => ("unable to capture screen", "UnableToCaptureScreenError", Some(63)),
	/// Carries the text of the blocking dialog when the remote end reports it.
	UnexpectedAlertOpen => ("unexpected alert open", "UnexpectedAlertOpenError", Some(26)),
	UnknownCommand => ("unknown command", "UnknownCommandError", Some(9)),
	UnknownMethod => ("unknown method", "UnknownMethodError", None),
	UnsupportedOperation => ("unsupported operation", "UnsupportedOperationError", Some(9)),
}

impl ErrorKind {
	/// Maps a non-zero legacy status code to a kind.
	///
	/// Several codes collapse onto one kind; unmapped codes yield `None`.
	pub fn from_legacy_status(status: i64) -> Option<ErrorKind> {
		let kind = match status {
			6 => ErrorKind::NoSuchSession,
			7 => ErrorKind::NoSuchElement,
			8 => ErrorKind::NoSuchFrame,
			9 | 405 => ErrorKind::UnsupportedOperation,
			10 => ErrorKind::StaleElementReference,
			12 => ErrorKind::InvalidElementState,
			13 => ErrorKind::Unknown,
			15 => ErrorKind::ElementNotSelectable,
			17 => ErrorKind::JavascriptError,
			19 | 32 | 51 | 52 => ErrorKind::InvalidSelector,
			21 => ErrorKind::Timeout,
			23 => ErrorKind::NoSuchWindow,
			24 => ErrorKind::InvalidCookieDomain,
			25 => ErrorKind::UnableToSetCookie,
			26 => ErrorKind::UnexpectedAlertOpen,
			27 => ErrorKind::NoSuchAlert,
			28 => ErrorKind::ScriptTimeout,
			29 => ErrorKind::InvalidCoordinates,
			33 => ErrorKind::SessionNotCreated,
			34 => ErrorKind::MoveTargetOutOfBounds,
			60 => ErrorKind::ElementNotInteractable,
			61 => ErrorKind::InvalidArgument,
			62 => ErrorKind::NoSuchCookie,
			63 => ErrorKind::UnableToCaptureScreen,
			64 => ErrorKind::ElementClickIntercepted,
			_ => return None,
		};
		Some(kind)
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A failure reported by (or emulating) the remote end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct WebDriverError {
	pub kind: ErrorKind,
	pub message: String,
	/// Stack trace supplied by the remote end, if any.
	pub remote_stacktrace: Option<String>,
	/// Text of the open dialog for [`ErrorKind::UnexpectedAlertOpen`].
	pub alert_text: Option<String>,
}

impl WebDriverError {
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
			remote_stacktrace: None,
			alert_text: None,
		}
	}

	pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
		self.remote_stacktrace = Some(stacktrace.into());
		self
	}

	pub fn with_alert_text(mut self, text: impl Into<String>) -> Self {
		self.alert_text = Some(text.into());
		self
	}
}

/// Errors that can occur while driving a remote end.
#[derive(Debug, Clone, Error)]
pub enum Error {
	/// Remote end reported an error, or a local check failed with a WebDriver kind.
	#[error(transparent)]
	WebDriver(#[from] WebDriverError),

	/// Network-level failure after transport retries were exhausted.
	#[error(transparent)]
	Network(#[from] NetworkError),

	/// A URL could not be parsed or resolved.
	#[error("Invalid URL: {0}")]
	InvalidUrl(String),

	/// Caller misuse: wrong argument shapes, non-element wait results, and the like.
	#[error("{0}")]
	Contract(String),

	/// The driver service could not be started or reached.
	#[error("Driver service error: {0}")]
	Service(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(Arc<std::io::Error>),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(Arc<serde_json::Error>),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Error::Io(Arc::new(err))
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Json(Arc::new(err))
	}
}

impl Error {
	/// Builds a WebDriver error of the given kind.
	pub fn webdriver(kind: ErrorKind, message: impl Into<String>) -> Self {
		Error::WebDriver(WebDriverError::new(kind, message))
	}

	/// Generic remote failure.
	pub fn unknown(message: impl Into<String>) -> Self {
		Self::webdriver(ErrorKind::Unknown, message)
	}

	pub fn invalid_argument(message: impl Into<String>) -> Self {
		Self::webdriver(ErrorKind::InvalidArgument, message)
	}

	pub fn timeout(message: impl Into<String>) -> Self {
		Self::webdriver(ErrorKind::Timeout, message)
	}

	/// Returns the WebDriver kind, if this is a WebDriver error.
	pub fn kind(&self) -> Option<ErrorKind> {
		match self {
			Error::WebDriver(err) => Some(err.kind),
			_ => None,
		}
	}

	/// Returns true if this is a WebDriver error of `kind`.
	pub fn is_kind(&self, kind: ErrorKind) -> bool {
		self.kind() == Some(kind)
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		self.is_kind(ErrorKind::Timeout)
	}

	pub fn is_no_such_element(&self) -> bool {
		self.is_kind(ErrorKind::NoSuchElement)
	}

	/// Returns the error message without the kind prefix.
	pub fn message(&self) -> String {
		match self {
			Error::WebDriver(err) => err.message.clone(),
			other => other.to_string(),
		}
	}

	/// Returns the remote stack trace, if the remote end supplied one.
	pub fn remote_stacktrace(&self) -> Option<&str> {
		match self {
			Error::WebDriver(err) => err.remote_stacktrace.as_deref(),
			_ => None,
		}
	}
}

/// Returns true if `data` is a W3C error payload (an object with a string `error`).
pub fn is_error_response(data: &Value) -> bool {
	data.get("error").is_some_and(Value::is_string)
}

/// Decodes a W3C error payload into an error.
///
/// Unmapped codes become [`ErrorKind::Unknown`]. Payloads that are not error
/// objects yield a generic error naming the payload.
pub fn decode_error(data: &Value) -> Error {
	let Some(code) = data.get("error").and_then(Value::as_str) else {
		return Error::unknown(format!("Unknown error: {}", data));
	};

	let kind = ErrorKind::from_code(code).unwrap_or(ErrorKind::Unknown);
	let message = data.get("message").and_then(Value::as_str).unwrap_or_default();
	let mut err = WebDriverError::new(kind, message);

	if let Some(trace) = data
		.get("stacktrace")
		.and_then(Value::as_str)
		.or_else(|| data.get("stackTrace").and_then(Value::as_str))
	{
		err = err.with_stacktrace(trace);
	}

	if kind == ErrorKind::UnexpectedAlertOpen {
		if let Some(text) = data.pointer("/data/text").and_then(Value::as_str) {
			err = err.with_alert_text(text);
		}
	}

	Error::WebDriver(err)
}

/// Checks a legacy response body for a non-zero numeric `status`.
///
/// Returns `Ok(())` for success bodies and for anything without a numeric
/// status.
pub fn check_legacy_response(body: &Value) -> Result<()> {
	let Some(status) = body.get("status").and_then(Value::as_f64) else {
		return Ok(());
	};
	if status == 0.0 {
		return Ok(());
	}

	let kind = if status.fract() == 0.0 {
		ErrorKind::from_legacy_status(status as i64).unwrap_or(ErrorKind::Unknown)
	} else {
		ErrorKind::Unknown
	};
	let value = body.get("value").unwrap_or(&Value::Null);

	let err = match value {
		Value::Object(map) => {
			let message = match map.get("message") {
				Some(Value::String(message)) => message.clone(),
				Some(other) => other.to_string(),
				None => String::new(),
			};
			let mut err = WebDriverError::new(kind, message);
			if kind == ErrorKind::UnexpectedAlertOpen {
				let text = value.pointer("/alert/text").and_then(Value::as_str).unwrap_or_default();
				err = err.with_alert_text(text);
			}
			err
		}
		Value::String(message) => WebDriverError::new(kind, message.clone()),
		other => WebDriverError::new(kind, other.to_string()),
	};

	Err(Error::WebDriver(err))
}

/// Encodes an error as a W3C `{error, message}` payload.
///
/// Errors without a WebDriver kind use the generic `"unknown error"` code.
pub fn encode_error(err: &Error) -> Value {
	let code = err.kind().unwrap_or(ErrorKind::Unknown).code();
	json!({
		"error": code,
		"message": err.message(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_every_code_round_trips() {
		for kind in ErrorKind::ALL {
			assert_eq!(ErrorKind::from_code(kind.code()), Some(*kind));
		}
	}

	#[test]
	fn test_decode_known_code() {
		let err = decode_error(&json!({
			"error": "stale element reference",
			"message": "gone",
			"stacktrace": "at foo",
		}));
		assert!(err.is_kind(ErrorKind::StaleElementReference));
		assert_eq!(err.message(), "gone");
		assert_eq!(err.remote_stacktrace(), Some("at foo"));
	}

	#[test]
	fn test_decode_prefers_lowercase_stacktrace() {
		let err = decode_error(&json!({
			"error": "timeout",
			"message": "",
			"stacktrace": "lower",
			"stackTrace": "camel",
		}));
		assert_eq!(err.remote_stacktrace(), Some("lower"));

		let camel = decode_error(&json!({"error": "timeout", "stackTrace": "camel"}));
		assert_eq!(camel.remote_stacktrace(), Some("camel"));
	}

	#[test]
	fn test_decode_unmapped_code_is_generic() {
		let err = decode_error(&json!({"error": "something new", "message": "huh"}));
		assert!(err.is_kind(ErrorKind::Unknown));
		assert_eq!(err.message(), "huh");
	}

	#[test]
	fn test_decode_non_error_payload() {
		let err = decode_error(&json!({"foo": 1}));
		assert!(err.is_kind(ErrorKind::Unknown));
		assert_eq!(err.message(), "Unknown error: {\"foo\":1}");
	}

	#[test]
	fn test_invalid_session_id_maps_to_no_such_session() {
		let err = decode_error(&json!({"error": "invalid session id", "message": "dead"}));
		assert!(err.is_kind(ErrorKind::NoSuchSession));
	}

	#[test]
	fn test_legacy_string_value() {
		let err = check_legacy_response(&json!({"status": 7, "value": "no element"})).unwrap_err();
		assert!(err.is_no_such_element());
		assert_eq!(err.message(), "no element");
	}

	#[test]
	fn test_legacy_float_status() {
		let err = check_legacy_response(&json!({"status": 7.0, "value": "no element"})).unwrap_err();
		assert!(err.is_no_such_element());
		assert!(check_legacy_response(&json!({"status": 0.0, "value": null})).is_ok());
	}

	#[test]
	fn test_legacy_object_value() {
		let err = check_legacy_response(&json!({"status": 10, "value": {"message": "stale"}})).unwrap_err();
		assert!(err.is_kind(ErrorKind::StaleElementReference));
		assert_eq!(err.message(), "stale");
	}

	#[test]
	fn test_legacy_alert_text() {
		let err = check_legacy_response(&json!({
			"status": 26,
			"value": {"message": "alert open", "alert": {"text": "hello"}},
		}))
		.unwrap_err();
		match err {
			Error::WebDriver(err) => {
				assert_eq!(err.kind, ErrorKind::UnexpectedAlertOpen);
				assert_eq!(err.alert_text.as_deref(), Some("hello"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn test_legacy_codes_collapse() {
		for status in [9, 405] {
			assert_eq!(ErrorKind::from_legacy_status(status), Some(ErrorKind::UnsupportedOperation));
		}
		for status in [19, 32, 51, 52] {
			assert_eq!(ErrorKind::from_legacy_status(status), Some(ErrorKind::InvalidSelector));
		}
		let err = check_legacy_response(&json!({"status": 11, "value": "hidden"})).unwrap_err();
		assert!(err.is_kind(ErrorKind::Unknown));
	}

	#[test]
	fn test_legacy_success_and_missing_status() {
		assert!(check_legacy_response(&json!({"status": 0, "value": 1})).is_ok());
		assert!(check_legacy_response(&json!({"value": "x"})).is_ok());
		assert!(check_legacy_response(&json!({"status": "7"})).is_ok());
	}

	#[test]
	fn test_encode_error() {
		let err = Error::webdriver(ErrorKind::NoSuchFrame, "missing");
		assert_eq!(encode_error(&err), json!({"error": "no such frame", "message": "missing"}));

		let contract = Error::Contract("bad".into());
		assert_eq!(encode_error(&contract), json!({"error": "unknown error", "message": "bad"}));
	}

	#[test]
	fn test_display_includes_kind_name() {
		let err = Error::webdriver(ErrorKind::NoSuchElement, "nope");
		assert_eq!(err.to_string(), "NoSuchElementError: nope");
	}
}
