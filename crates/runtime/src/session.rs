//! Remote session identity.

use serde::{Serialize, Serializer};
use serde_json::Value;
use wd_protocol::Capabilities;

/// A session created by the remote end.
///
/// Immutable once created; capabilities are never renegotiated. Serializes as
/// its bare id.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
	id: String,
	capabilities: Capabilities,
}

impl Session {
	pub fn new(id: impl Into<String>, capabilities: impl Into<Capabilities>) -> Self {
		Self {
			id: id.into(),
			capabilities: capabilities.into(),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn capabilities(&self) -> &Capabilities {
		&self.capabilities
	}

	pub fn capability(&self, key: &str) -> Option<&Value> {
		self.capabilities.get(key)
	}
}

impl Serialize for Session {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.id)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_session_serializes_as_id() {
		let session = Session::new("abc", json!({"browserName": "chrome"}));
		assert_eq!(serde_json::to_value(&session).unwrap(), json!("abc"));
		assert_eq!(session.capability("browserName"), Some(&json!("chrome")));
		assert_eq!(session.capabilities().get_browser_name(), Some("chrome"));
	}
}
