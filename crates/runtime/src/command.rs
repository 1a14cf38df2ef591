//! Commands sent to a remote end.

use serde_json::{Map, Value};
pub use wd_protocol::CommandName;

/// A named remote operation and its parameters.
///
/// Parameters are plain JSON. Values that need asynchronous preparation
/// (pending element ids, file contents) are resolved by the caller before a
/// command is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
	name: CommandName,
	parameters: Map<String, Value>,
}

impl Command {
	pub fn new(name: impl Into<CommandName>) -> Self {
		Self {
			name: name.into(),
			parameters: Map::new(),
		}
	}

	pub fn name(&self) -> &CommandName {
		&self.name
	}

	/// Sets a parameter, returning the command for chaining.
	pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.set_parameter(key, value);
		self
	}

	/// Merges every entry of `parameters` into this command.
	pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
		self.parameters.extend(parameters);
		self
	}

	pub fn set_parameter(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.parameters.insert(key.into(), value.into());
	}

	pub fn parameter(&self, key: &str) -> Option<&Value> {
		self.parameters.get(key)
	}

	pub fn parameters(&self) -> &Map<String, Value> {
		&self.parameters
	}

	pub fn parameters_mut(&mut self) -> &mut Map<String, Value> {
		&mut self.parameters
	}

	pub fn into_parts(self) -> (CommandName, Map<String, Value>) {
		(self.name, self.parameters)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_builder() {
		let command = Command::new(CommandName::Get)
			.with_parameter("sessionId", "abc")
			.with_parameter("url", "https://example.com");

		assert_eq!(command.name(), &CommandName::Get);
		assert_eq!(command.parameter("url"), Some(&json!("https://example.com")));
		assert_eq!(command.parameters().len(), 2);
	}

	#[test]
	fn test_set_parameter_overwrites() {
		let mut command = Command::new("launchApp").with_parameter("id", 1);
		command.set_parameter("id", 2);
		assert_eq!(command.parameter("id"), Some(&json!(2)));
		assert_eq!(command.name(), &CommandName::Custom("launchApp".into()));
	}
}
