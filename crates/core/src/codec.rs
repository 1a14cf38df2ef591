//! Wire value codec.
//!
//! [`encode`] turns an [`Arg`] tree into plain JSON, awaiting pending values
//! at any depth. Handles, capability sets, and file uploads implement
//! [`WireSerialize`] and produce their own representation, which is encoded in
//! turn.
//!
//! [`decode`] goes the other way: element and shadow-root references in a
//! response become [`WebElement`] and [`ShadowRoot`] handles bound to the
//! driver that issued the command.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use wd_protocol::{Capabilities, reference};
use wd_runtime::{Error, Result};

use crate::driver::WebDriver;
use crate::element::WebElement;
use crate::shadow_root::ShadowRoot;

/// Future returned by [`WireSerialize::to_wire`].
pub type SerializeFuture<'a> = Pin<Box<dyn Future<Output = Result<Arg>> + Send + 'a>>;

/// A value that produces its own wire representation.
///
/// The returned [`Arg`] is encoded recursively, so it may contain further
/// pending values.
pub trait WireSerialize: Send + Sync {
	fn to_wire(&self) -> SerializeFuture<'_>;
}

/// A command argument on its way to the remote end.
pub enum Arg {
	/// Plain JSON, sent as is.
	Json(Value),
	List(Vec<Arg>),
	/// Object entries, keys preserved.
	Map(Vec<(String, Arg)>),
	Custom(Box<dyn WireSerialize>),
	/// A value still being computed.
	Pending(BoxFuture<'static, Result<Arg>>),
}

impl Arg {
	pub fn null() -> Self {
		Arg::Json(Value::Null)
	}

	/// Wraps a future producing the argument.
	pub fn pending<F>(value: F) -> Self
	where
		F: Future<Output = Result<Arg>> + Send + 'static,
	{
		Arg::Pending(value.boxed())
	}

	/// Converts any serde-serializable value.
	pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
		Ok(Arg::Json(serde_json::to_value(value)?))
	}

	pub fn map<I, K, V>(entries: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Arg>,
	{
		Arg::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

impl fmt::Debug for Arg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Arg::Json(value) => write!(f, "Json({value})"),
			Arg::List(items) => f.debug_tuple("List").field(items).finish(),
			Arg::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
			Arg::Custom(_) => f.write_str("Custom(..)"),
			Arg::Pending(_) => f.write_str("Pending(..)"),
		}
	}
}

macro_rules! json_args {
	($($ty:ty),+) => {
		$(impl From<$ty> for Arg {
			fn from(value: $ty) -> Self {
				Arg::Json(Value::from(value))
			}
		})+
	};
}

json_args!(Value, bool, i32, i64, u32, u64, f64, String, &str);

impl From<&String> for Arg {
	fn from(value: &String) -> Self {
		Arg::Json(Value::String(value.clone()))
	}
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
	fn from(items: Vec<T>) -> Self {
		Arg::List(items.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
	fn from(value: Option<T>) -> Self {
		value.map_or_else(Arg::null, Into::into)
	}
}

impl From<Capabilities> for Arg {
	fn from(capabilities: Capabilities) -> Self {
		Arg::Custom(Box::new(capabilities))
	}
}

impl WireSerialize for Capabilities {
	fn to_wire(&self) -> SerializeFuture<'_> {
		Box::pin(async move { Ok(Arg::Json(self.to_json())) })
	}
}

impl From<RemoteValue> for Arg {
	fn from(value: RemoteValue) -> Self {
		match value {
			RemoteValue::Element(element) => element.into(),
			RemoteValue::ShadowRoot(root) => root.into(),
			RemoteValue::Array(items) => Arg::List(items.into_iter().map(Arg::from).collect()),
			RemoteValue::Object(entries) => Arg::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect()),
			other => Arg::Json(other.into_json()),
		}
	}
}

/// Encodes `arg` depth-first into a JSON value.
pub fn encode(arg: Arg) -> BoxFuture<'static, Result<Value>> {
	async move {
		match arg {
			Arg::Json(value) => Ok(value),
			Arg::List(items) => {
				let mut out = Vec::with_capacity(items.len());
				for item in items {
					out.push(encode(item).await?);
				}
				Ok(Value::Array(out))
			}
			Arg::Map(entries) => Ok(Value::Object(encode_entries(entries).await?)),
			Arg::Custom(value) => {
				let wire = value.to_wire().await?;
				encode(wire).await
			}
			Arg::Pending(value) => {
				let resolved = value.await?;
				encode(resolved).await
			}
		}
	}
	.boxed()
}

async fn encode_entries(entries: Vec<(String, Arg)>) -> Result<Map<String, Value>> {
	let mut map = Map::new();
	for (key, value) in entries {
		let value = encode(value).await?;
		map.insert(key, value);
	}
	Ok(map)
}

/// Named command parameters whose values may still be pending.
#[derive(Debug, Default)]
pub struct Params(Vec<(String, Arg)>);

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a parameter, replacing any previous value.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Arg>) -> Self {
		self.set(key, value);
		self
	}

	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Arg>) {
		let key = key.into();
		self.0.retain(|(k, _)| *k != key);
		self.0.push((key, value.into()));
	}

	pub fn contains(&self, key: &str) -> bool {
		self.0.iter().any(|(k, _)| k == key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Resolves every parameter to JSON.
	pub async fn encode(self) -> Result<Map<String, Value>> {
		encode_entries(self.0).await
	}
}

impl From<Map<String, Value>> for Params {
	fn from(map: Map<String, Value>) -> Self {
		Params(map.into_iter().map(|(k, v)| (k, Arg::Json(v))).collect())
	}
}

impl<K: Into<String>, V: Into<Arg>> FromIterator<(K, V)> for Params {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Params::new();
		for (key, value) in iter {
			params.set(key, value);
		}
		params
	}
}

/// A decoded response value.
#[derive(Debug, Clone, Default)]
pub enum RemoteValue {
	#[default]
	Null,
	Bool(bool),
	Number(Number),
	String(String),
	Array(Vec<RemoteValue>),
	Object(BTreeMap<String, RemoteValue>),
	Element(WebElement),
	ShadowRoot(ShadowRoot),
}

impl RemoteValue {
	pub fn is_null(&self) -> bool {
		matches!(self, RemoteValue::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			RemoteValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			RemoteValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			RemoteValue::Number(n) => n.as_f64(),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			RemoteValue::Number(n) => n.as_i64(),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[RemoteValue]> {
		match self {
			RemoteValue::Array(items) => Some(items),
			_ => None,
		}
	}

	pub fn get(&self, key: &str) -> Option<&RemoteValue> {
		match self {
			RemoteValue::Object(entries) => entries.get(key),
			_ => None,
		}
	}

	pub fn as_element(&self) -> Option<&WebElement> {
		match self {
			RemoteValue::Element(element) => Some(element),
			_ => None,
		}
	}

	pub fn into_element(self) -> Option<WebElement> {
		match self {
			RemoteValue::Element(element) => Some(element),
			_ => None,
		}
	}

	pub fn into_shadow_root(self) -> Option<ShadowRoot> {
		match self {
			RemoteValue::ShadowRoot(root) => Some(root),
			_ => None,
		}
	}

	/// Elements of an array result; anything else yields an empty list.
	pub fn into_elements(self) -> Vec<WebElement> {
		match self {
			RemoteValue::Array(items) => items.into_iter().filter_map(RemoteValue::into_element).collect(),
			_ => Vec::new(),
		}
	}

	/// JavaScript truthiness: null, false, 0, NaN, and `""` are falsy.
	pub fn is_truthy(&self) -> bool {
		match self {
			RemoteValue::Null => false,
			RemoteValue::Bool(b) => *b,
			RemoteValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
			RemoteValue::String(s) => !s.is_empty(),
			_ => true,
		}
	}

	/// Short name of the value's shape, for error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			RemoteValue::Null => "null",
			RemoteValue::Bool(_) => "boolean",
			RemoteValue::Number(_) => "number",
			RemoteValue::String(_) => "string",
			RemoteValue::Array(_) => "array",
			RemoteValue::Object(_) => "object",
			RemoteValue::Element(_) => "WebElement",
			RemoteValue::ShadowRoot(_) => "ShadowRoot",
		}
	}

	/// Converts back to JSON. Handles become wire references; a handle whose
	/// id is still pending becomes null.
	pub fn into_json(self) -> Value {
		match self {
			RemoteValue::Null => Value::Null,
			RemoteValue::Bool(b) => Value::Bool(b),
			RemoteValue::Number(n) => Value::Number(n),
			RemoteValue::String(s) => Value::String(s),
			RemoteValue::Array(items) => Value::Array(items.into_iter().map(RemoteValue::into_json).collect()),
			RemoteValue::Object(entries) => Value::Object(entries.into_iter().map(|(k, v)| (k, v.into_json())).collect()),
			RemoteValue::Element(element) => element
				.resolved_id()
				.map_or(Value::Null, reference::element_reference),
			RemoteValue::ShadowRoot(root) => root
				.resolved_id()
				.map_or(Value::Null, reference::shadow_root_reference),
		}
	}

	/// Deserializes the JSON form of this value.
	pub fn deserialize<T: DeserializeOwned>(self) -> Result<T> {
		serde_json::from_value(self.into_json()).map_err(Error::from)
	}
}

impl PartialEq for RemoteValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(RemoteValue::Null, RemoteValue::Null) => true,
			(RemoteValue::Bool(a), RemoteValue::Bool(b)) => a == b,
			(RemoteValue::Number(a), RemoteValue::Number(b)) => a == b,
			(RemoteValue::String(a), RemoteValue::String(b)) => a == b,
			(RemoteValue::Array(a), RemoteValue::Array(b)) => a == b,
			(RemoteValue::Object(a), RemoteValue::Object(b)) => a == b,
			(RemoteValue::Element(a), RemoteValue::Element(b)) => a == b,
			(RemoteValue::ShadowRoot(a), RemoteValue::ShadowRoot(b)) => a == b,
			_ => false,
		}
	}
}

impl From<Value> for RemoteValue {
	fn from(value: Value) -> Self {
		match value {
			Value::Null => RemoteValue::Null,
			Value::Bool(b) => RemoteValue::Bool(b),
			Value::Number(n) => RemoteValue::Number(n),
			Value::String(s) => RemoteValue::String(s),
			Value::Array(items) => RemoteValue::Array(items.into_iter().map(RemoteValue::from).collect()),
			Value::Object(map) => RemoteValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
		}
	}
}

/// Decodes a wire value, binding handles to `owner`.
pub fn decode(owner: &WebDriver, value: Value) -> RemoteValue {
	match value {
		Value::Array(items) => RemoteValue::Array(items.into_iter().map(|v| decode(owner, v)).collect()),
		Value::Object(map) => {
			let value = Value::Object(map);
			if let Some(id) = reference::element_id(&value) {
				return RemoteValue::Element(WebElement::new(owner, id));
			}
			if let Some(id) = reference::shadow_root_id(&value) {
				return RemoteValue::ShadowRoot(ShadowRoot::new(owner, id));
			}
			match value {
				Value::Object(map) => RemoteValue::Object(map.into_iter().map(|(k, v)| (k, decode(owner, v))).collect()),
				other => RemoteValue::from(other),
			}
		}
		other => RemoteValue::from(other),
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use serde_json::json;
	use wd_runtime::Session;

	use super::*;
	use crate::testing::NullExecutor;

	fn driver() -> WebDriver {
		WebDriver::new(Session::new("s1", json!({})), Arc::new(NullExecutor))
	}

	struct Later(&'static str);

	impl WireSerialize for Later {
		fn to_wire(&self) -> SerializeFuture<'_> {
			let value = self.0;
			Box::pin(async move {
				tokio::task::yield_now().await;
				Ok(Arg::pending(async move { Ok(Arg::from(vec![value])) }))
			})
		}
	}

	#[tokio::test]
	async fn test_encode_resolves_nested_values() {
		let arg = Arg::map([
			("plain", Arg::from(1)),
			("list", Arg::from(vec![Arg::from("a"), Arg::pending(async { Ok(Arg::from(true)) })])),
			("custom", Arg::Custom(Box::new(Later("x")))),
			("missing", Arg::from(None::<String>)),
		]);

		let value = encode(arg).await.unwrap();
		assert_eq!(
			value,
			json!({"plain": 1, "list": ["a", true], "custom": ["x"], "missing": null})
		);
	}

	#[tokio::test]
	async fn test_encode_capabilities_drops_nulls() {
		let caps = Capabilities::for_browser("chrome").set("proxy", Value::Null);
		assert_eq!(encode(caps.into()).await.unwrap(), json!({"browserName": "chrome"}));
	}

	#[tokio::test]
	async fn test_pending_failure_propagates() {
		let arg = Arg::from(vec![Arg::pending(async { Err(Error::unknown("no file")) })]);
		assert_eq!(encode(arg).await.unwrap_err().message(), "no file");
	}

	#[tokio::test]
	async fn test_element_round_trip_keeps_id_and_owner() {
		let driver = driver();
		let element = WebElement::new(&driver, "e-42");

		let wire = encode(element.clone().into()).await.unwrap();
		assert_eq!(wire[reference::ELEMENT_KEY], "e-42");
		assert_eq!(wire[reference::LEGACY_ELEMENT_KEY], "e-42");

		let decoded = decode(&driver, wire).into_element().unwrap();
		assert_eq!(decoded.resolved_id(), Some("e-42"));
		assert!(decoded.driver().unwrap().ptr_eq(&driver));
		assert_eq!(decoded, element);
	}

	#[tokio::test]
	async fn test_shadow_root_round_trip() {
		let driver = driver();
		let root = ShadowRoot::new(&driver, "sr-1");

		let wire = encode(root.clone().into()).await.unwrap();
		assert_eq!(wire, reference::shadow_root_reference("sr-1"));

		let decoded = decode(&driver, wire).into_shadow_root().unwrap();
		assert_eq!(decoded, root);
	}

	#[test]
	fn test_decode_nested_structures() {
		let driver = driver();
		let value = decode(
			&driver,
			json!({
				"items": [reference::element_reference("a"), 2],
				"label": "x",
			}),
		);

		let items = value.get("items").and_then(RemoteValue::as_array).unwrap();
		assert_eq!(items[0].as_element().and_then(WebElement::resolved_id), Some("a"));
		assert_eq!(items[1].as_i64(), Some(2));
		assert_eq!(value.get("label").and_then(RemoteValue::as_str), Some("x"));
	}

	#[test]
	fn test_truthiness() {
		assert!(!RemoteValue::Null.is_truthy());
		assert!(!RemoteValue::from(json!(0)).is_truthy());
		assert!(!RemoteValue::from(json!("")).is_truthy());
		assert!(RemoteValue::from(json!([])).is_truthy());
		assert!(RemoteValue::from(json!({})).is_truthy());
		assert!(RemoteValue::from(json!("0")).is_truthy());
	}

	#[test]
	fn test_params_replace_existing_key() {
		let mut params = Params::new().with("a", 1).with("b", 2);
		params.set("a", 3);
		assert_eq!(params.len(), 2);
		assert!(params.contains("a"));
	}
}
