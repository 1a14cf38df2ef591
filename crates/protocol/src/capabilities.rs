//! Session capabilities.
//!
//! A [`Capabilities`] value is a string-keyed bag of negotiated session
//! properties. Before a new-session request is sent, [`Capabilities::filter_w3c`]
//! strips everything a strict W3C endpoint would reject: only the standard
//! capability names and vendor-namespaced keys (`goog:chromeOptions`,
//! `ms:edgeOptions`, ...) survive.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::proxy::ProxyConfig;
use crate::types::Timeouts;

/// Capability names defined by the W3C WebDriver standard.
pub const W3C_CAPABILITY_NAMES: &[&str] = &[
	"acceptInsecureCerts",
	"browserName",
	"browserVersion",
	"pageLoadStrategy",
	"platformName",
	"proxy",
	"setWindowRect",
	"strictFileInteractability",
	"timeouts",
	"unhandledPromptBehavior",
	"webSocketUrl",
];

/// Well-known `browserName` values.
pub struct Browser;

impl Browser {
	pub const CHROME: &'static str = "chrome";
	pub const EDGE: &'static str = "MicrosoftEdge";
	pub const FIREFOX: &'static str = "firefox";
	pub const INTERNET_EXPLORER: &'static str = "internet explorer";
	pub const SAFARI: &'static str = "safari";
}

/// Page load strategy capability values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLoadStrategy {
	/// Return as soon as the initial document is fetched.
	None,
	/// Wait for `DOMContentLoaded`.
	Eager,
	/// Wait for the `load` event.
	Normal,
}

/// Negotiated or requested session properties.
///
/// Null-valued entries are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(Map<String, Value>);

impl Capabilities {
	/// Creates an empty capability set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a capability set requesting the given browser.
	pub fn for_browser(name: impl Into<String>) -> Self {
		Self::new().browser_name(name)
	}

	/// Sets a capability, replacing any previous value.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(key, value);
		self
	}

	/// Sets a capability in place.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.0.insert(key.into(), value.into());
	}

	/// Removes a capability, returning its previous value.
	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.0.remove(key)
	}

	/// Returns the value of a capability.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns true if the capability is present.
	pub fn has(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Iterates over capability names.
	pub fn keys(&self) -> impl Iterator<Item = &String> {
		self.0.keys()
	}

	/// Number of capabilities.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no capabilities are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Copies every entry of `other` into this set, overwriting collisions.
	pub fn merge(mut self, other: &Capabilities) -> Self {
		for (key, value) in &other.0 {
			self.0.insert(key.clone(), value.clone());
		}
		self
	}

	pub fn browser_name(self, name: impl Into<String>) -> Self {
		self.set("browserName", name.into())
	}

	pub fn get_browser_name(&self) -> Option<&str> {
		self.get("browserName").and_then(Value::as_str)
	}

	pub fn browser_version(self, version: impl Into<String>) -> Self {
		self.set("browserVersion", version.into())
	}

	pub fn platform_name(self, platform: impl Into<String>) -> Self {
		self.set("platformName", platform.into())
	}

	pub fn get_platform_name(&self) -> Option<&str> {
		self.get("platformName").and_then(Value::as_str)
	}

	pub fn accept_insecure_certs(self, accept: bool) -> Self {
		self.set("acceptInsecureCerts", accept)
	}

	pub fn page_load_strategy(self, strategy: PageLoadStrategy) -> Self {
		let value = serde_json::to_value(strategy).unwrap_or(Value::Null);
		self.set("pageLoadStrategy", value)
	}

	/// Sets the `unhandledPromptBehavior` capability (e.g. `"accept"`, `"dismiss and notify"`).
	pub fn unhandled_prompt_behavior(self, behavior: impl Into<String>) -> Self {
		self.set("unhandledPromptBehavior", behavior.into())
	}

	pub fn strict_file_interactability(self, strict: bool) -> Self {
		self.set("strictFileInteractability", strict)
	}

	pub fn proxy(self, proxy: &ProxyConfig) -> Self {
		let value = serde_json::to_value(proxy).unwrap_or(Value::Null);
		self.set("proxy", value)
	}

	pub fn timeouts(self, timeouts: &Timeouts) -> Self {
		let value = serde_json::to_value(timeouts).unwrap_or(Value::Null);
		self.set("timeouts", value)
	}

	/// Sets `goog:loggingPrefs`.
	pub fn logging_prefs(self, prefs: Value) -> Self {
		self.set("goog:loggingPrefs", prefs)
	}

	/// Returns a copy holding only W3C capability names and vendor-prefixed keys.
	pub fn filter_w3c(&self) -> Capabilities {
		let map = self
			.0
			.iter()
			.filter(|(key, _)| W3C_CAPABILITY_NAMES.contains(&key.as_str()) || key.contains(':'))
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();
		Capabilities(map)
	}

	/// Returns the capabilities as a JSON object, dropping null entries.
	pub fn to_json(&self) -> Value {
		let map = self
			.0
			.iter()
			.filter(|(_, value)| !value.is_null())
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();
		Value::Object(map)
	}

	/// Consumes the set, returning the underlying map.
	pub fn into_inner(self) -> Map<String, Value> {
		self.0
	}
}

impl Serialize for Capabilities {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_json().serialize(serializer)
	}
}

impl From<Map<String, Value>> for Capabilities {
	fn from(map: Map<String, Value>) -> Self {
		Capabilities(map)
	}
}

impl From<Value> for Capabilities {
	/// Non-object values yield an empty set.
	fn from(value: Value) -> Self {
		match value {
			Value::Object(map) => Capabilities(map),
			_ => Capabilities::default(),
		}
	}
}
