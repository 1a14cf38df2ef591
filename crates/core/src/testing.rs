//! Executors for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use wd_runtime::{Command, CommandExecutor, CommandName, CommandResponse, ExecuteFuture, Result, Session};

use crate::driver::WebDriver;

/// Answers every command with null.
pub(crate) struct NullExecutor;

impl CommandExecutor for NullExecutor {
	fn execute(&self, _command: Command) -> ExecuteFuture<'_> {
		Box::pin(async { Ok(CommandResponse::Value(Value::Null)) })
	}
}

/// Replays queued responses per command and records what was sent.
///
/// The last queued response for a command is repeated. Commands with nothing
/// queued answer null.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
	responses: Mutex<HashMap<CommandName, VecDeque<Result<Value>>>>,
	sent: Mutex<Vec<Command>>,
}

impl ScriptedExecutor {
	/// A driver on session `s1` backed by a fresh scripted executor.
	pub(crate) fn driver() -> (WebDriver, Arc<ScriptedExecutor>) {
		let executor = Arc::new(ScriptedExecutor::default());
		let session = Session::new("s1", json!({"browserName": "test"}));
		(WebDriver::new(session, executor.clone()), executor)
	}

	/// Queues a response for `name`.
	pub(crate) fn respond(&self, name: CommandName, response: Result<Value>) {
		self.responses.lock().entry(name).or_default().push_back(response);
	}

	/// Parameters of the most recent `name` command.
	pub(crate) fn last(&self, name: CommandName) -> Option<Map<String, Value>> {
		self.sent
			.lock()
			.iter()
			.rev()
			.find(|command| *command.name() == name)
			.map(|command| command.parameters().clone())
	}

	/// Names of every command sent, in order.
	pub(crate) fn names(&self) -> Vec<CommandName> {
		self.sent.lock().iter().map(|command| command.name().clone()).collect()
	}

	pub(crate) fn count(&self, name: CommandName) -> usize {
		self.sent.lock().iter().filter(|command| *command.name() == name).count()
	}

	fn next(&self, name: &CommandName) -> Result<Value> {
		let mut responses = self.responses.lock();
		match responses.get_mut(name) {
			Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Ok(Value::Null)),
			Some(queue) => queue.front().cloned().unwrap_or(Ok(Value::Null)),
			None => Ok(Value::Null),
		}
	}
}

impl CommandExecutor for ScriptedExecutor {
	fn execute(&self, command: Command) -> ExecuteFuture<'_> {
		Box::pin(async move {
			let name = command.name().clone();
			self.sent.lock().push(command);
			let value = self.next(&name)?;

			if name == CommandName::NewSession {
				let id = value.get("sessionId").and_then(Value::as_str).unwrap_or("s1").to_string();
				let capabilities = value.get("capabilities").cloned().unwrap_or(Value::Null);
				return Ok(CommandResponse::Session(Session::new(id, capabilities)));
			}
			Ok(CommandResponse::Value(value))
		})
	}
}
