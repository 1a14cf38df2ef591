//! Reserved wire keys identifying remote object handles.
//!
//! An element travels as `{"element-6066-11e4-a52e-4f735466cecf": id}` on W3C
//! endpoints and as `{"ELEMENT": id}` on legacy ones. Outgoing references carry
//! both keys; incoming ones are accepted with either. Shadow roots only have a
//! W3C form.

use serde_json::{Map, Value};

/// W3C key for element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Legacy JSON Wire Protocol key for element references.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// W3C key for shadow root references.
pub const SHADOW_ROOT_KEY: &str = "shadow-6066-11e4-a52e-4f735466cecf";

/// Builds the wire form of an element reference.
pub fn element_reference(id: &str) -> Value {
	let mut map = Map::with_capacity(2);
	map.insert(ELEMENT_KEY.to_string(), Value::String(id.to_string()));
	map.insert(LEGACY_ELEMENT_KEY.to_string(), Value::String(id.to_string()));
	Value::Object(map)
}

/// Builds the wire form of a shadow root reference.
pub fn shadow_root_reference(id: &str) -> Value {
	let mut map = Map::with_capacity(1);
	map.insert(SHADOW_ROOT_KEY.to_string(), Value::String(id.to_string()));
	Value::Object(map)
}

/// Returns true if `value` is an element reference in either dialect.
pub fn is_element_reference(value: &Value) -> bool {
	match value {
		Value::Object(map) => map.contains_key(ELEMENT_KEY) || map.contains_key(LEGACY_ELEMENT_KEY),
		_ => false,
	}
}

/// Returns true if `value` is a shadow root reference.
pub fn is_shadow_root_reference(value: &Value) -> bool {
	matches!(value, Value::Object(map) if map.contains_key(SHADOW_ROOT_KEY))
}

/// Extracts the id of an element reference, preferring the W3C key.
pub fn element_id(value: &Value) -> Option<&str> {
	let map = value.as_object()?;
	map.get(ELEMENT_KEY)
		.or_else(|| map.get(LEGACY_ELEMENT_KEY))
		.and_then(Value::as_str)
}

/// Extracts the id of a shadow root reference.
pub fn shadow_root_id(value: &Value) -> Option<&str> {
	value.as_object()?.get(SHADOW_ROOT_KEY)?.as_str()
}

/// Extracts the id of either kind of handle reference.
pub fn handle_id(value: &Value) -> Option<&str> {
	element_id(value).or_else(|| shadow_root_id(value))
}
