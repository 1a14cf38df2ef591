//! Common request and response payloads.

use serde::{Deserialize, Serialize};

/// Position and size of a window or element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
	#[serde(default)]
	pub x: f64,
	#[serde(default)]
	pub y: f64,
	#[serde(default)]
	pub width: f64,
	#[serde(default)]
	pub height: f64,
}

/// Session timeouts, in milliseconds.
///
/// Unset fields are left untouched when sent with a set-timeouts command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeouts {
	/// Implicit wait applied to element lookups.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub implicit: Option<u64>,
	/// Page load limit.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_load: Option<u64>,
	/// Script execution limit.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub script: Option<u64>,
}

impl Timeouts {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn implicit(mut self, ms: u64) -> Self {
		self.implicit = Some(ms);
		self
	}

	pub fn page_load(mut self, ms: u64) -> Self {
		self.page_load = Some(ms);
		self
	}

	pub fn script(mut self, ms: u64) -> Self {
		self.script = Some(ms);
		self
	}

	/// Returns true if no timeout is set.
	pub fn is_empty(&self) -> bool {
		self.implicit.is_none() && self.page_load.is_none() && self.script.is_none()
	}
}

/// Cookie `SameSite` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
	Strict,
	Lax,
	None,
}

impl SameSite {
	pub fn as_str(&self) -> &'static str {
		match self {
			SameSite::Strict => "Strict",
			SameSite::Lax => "Lax",
			SameSite::None => "None",
		}
	}
}

/// A browser cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
	pub name: String,
	pub value: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub domain: Option<String>,
	#[serde(default)]
	pub secure: bool,
	#[serde(default)]
	pub http_only: bool,
	/// Expiry as seconds since the Unix epoch.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expiry: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub same_site: Option<SameSite>,
}

impl Cookie {
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			..Self::default()
		}
	}

	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}

	pub fn secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	pub fn http_only(mut self, http_only: bool) -> Self {
		self.http_only = http_only;
		self
	}

	pub fn expiry(mut self, seconds: u64) -> Self {
		self.expiry = Some(seconds);
		self
	}

	pub fn same_site(mut self, same_site: SameSite) -> Self {
		self.same_site = Some(same_site);
		self
	}
}

/// Kind of top-level browsing context to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
	#[default]
	Tab,
	Window,
}

/// Handle and type of a newly opened window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewWindow {
	pub handle: String,
	#[serde(rename = "type")]
	pub kind: WindowType,
}

/// Standard log level names reported by remote ends.
pub struct LogLevel;

impl LogLevel {
	pub const OFF: &'static str = "OFF";
	pub const SEVERE: &'static str = "SEVERE";
	pub const WARNING: &'static str = "WARNING";
	pub const INFO: &'static str = "INFO";
	pub const DEBUG: &'static str = "DEBUG";
	pub const FINE: &'static str = "FINE";
	pub const FINER: &'static str = "FINER";
	pub const FINEST: &'static str = "FINEST";
	pub const ALL: &'static str = "ALL";
}

/// Standard log buffer names.
pub struct LogType;

impl LogType {
	pub const BROWSER: &'static str = "browser";
	pub const CLIENT: &'static str = "client";
	pub const DRIVER: &'static str = "driver";
	pub const PERFORMANCE: &'static str = "performance";
	pub const SERVER: &'static str = "server";
}

/// One entry from a remote log buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
	pub level: String,
	pub message: String,
	/// Milliseconds since the Unix epoch.
	#[serde(default)]
	pub timestamp: f64,
	#[serde(rename = "type", default)]
	pub kind: String,
}
