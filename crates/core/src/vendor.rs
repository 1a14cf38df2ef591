//! Chromium-family extension commands.
//!
//! A [`VendorProfile`] carries what distinguishes one Chromium-based browser
//! from another: its browser name, the prefix of its cast endpoints, and the
//! capability key of its options object. The commands themselves are shared.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use wd_protocol::Capabilities;
use wd_runtime::service::DEFAULT_START_TIMEOUT;
use wd_runtime::{DriverService, Error, HttpClient, HttpExecutor, Method, Result};

use crate::codec::{Arg, Params, RemoteValue};
use crate::driver::{OnQuit, WebDriver};

pub const LAUNCH_APP: &str = "launchApp";
pub const GET_NETWORK_CONDITIONS: &str = "getNetworkConditions";
pub const SET_NETWORK_CONDITIONS: &str = "setNetworkConditions";
pub const DELETE_NETWORK_CONDITIONS: &str = "deleteNetworkConditions";
pub const SEND_DEVTOOLS_COMMAND: &str = "sendDevToolsCommand";
pub const SEND_AND_GET_DEVTOOLS_COMMAND: &str = "sendAndGetDevToolsCommand";
pub const SET_PERMISSION: &str = "setPermission";
pub const GET_CAST_SINKS: &str = "getCastSinks";
pub const SET_CAST_SINK_TO_USE: &str = "setCastSinkToUse";
pub const START_CAST_DESKTOP_MIRRORING: &str = "startDesktopMirroring";
pub const START_CAST_TAB_MIRRORING: &str = "setCastTabMirroring";
pub const GET_CAST_ISSUE_MESSAGE: &str = "getCastIssueMessage";
pub const STOP_CASTING: &str = "stopCasting";

/// Identity of a Chromium-based browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorProfile {
	pub browser_name: String,
	/// Path segment of the cast endpoints, e.g. `goog`.
	pub command_prefix: String,
	/// Capability holding the browser's options object.
	pub options_key: String,
}

impl VendorProfile {
	/// A Chromium browser whose vendor prefix is `prefix`.
	pub fn chromium(prefix: impl Into<String>) -> Self {
		let prefix = prefix.into();
		Self {
			browser_name: "chrome".to_string(),
			options_key: format!("{prefix}:chromeOptions"),
			command_prefix: prefix,
		}
	}

	pub fn chrome() -> Self {
		Self::chromium("goog")
	}

	pub fn edge() -> Self {
		Self {
			browser_name: "MicrosoftEdge".to_string(),
			command_prefix: "ms".to_string(),
			options_key: "ms:edgeOptions".to_string(),
		}
	}

	/// `(name, method, path)` of every extension command.
	pub fn commands(&self) -> Vec<(&'static str, Method, String)> {
		let prefix = &self.command_prefix;
		vec![
			(LAUNCH_APP, Method::Post, "/session/:sessionId/chromium/launch_app".to_string()),
			(GET_NETWORK_CONDITIONS, Method::Get, "/session/:sessionId/chromium/network_conditions".to_string()),
			(SET_NETWORK_CONDITIONS, Method::Post, "/session/:sessionId/chromium/network_conditions".to_string()),
			(DELETE_NETWORK_CONDITIONS, Method::Delete, "/session/:sessionId/chromium/network_conditions".to_string()),
			(SEND_DEVTOOLS_COMMAND, Method::Post, "/session/:sessionId/chromium/send_command".to_string()),
			(
				SEND_AND_GET_DEVTOOLS_COMMAND,
				Method::Post,
				"/session/:sessionId/chromium/send_command_and_get_result".to_string(),
			),
			(SET_PERMISSION, Method::Post, "/session/:sessionId/permissions".to_string()),
			(GET_CAST_SINKS, Method::Get, format!("/session/:sessionId/{prefix}/cast/get_sinks")),
			(SET_CAST_SINK_TO_USE, Method::Post, format!("/session/:sessionId/{prefix}/cast/set_sink_to_use")),
			(
				START_CAST_DESKTOP_MIRRORING,
				Method::Post,
				format!("/session/:sessionId/{prefix}/cast/start_desktop_mirroring"),
			),
			(START_CAST_TAB_MIRRORING, Method::Post, format!("/session/:sessionId/{prefix}/cast/start_tab_mirroring")),
			(GET_CAST_ISSUE_MESSAGE, Method::Get, format!("/session/:sessionId/{prefix}/cast/get_issue_message")),
			(STOP_CASTING, Method::Post, format!("/session/:sessionId/{prefix}/cast/stop_casting")),
		]
	}

	/// Registers the extension commands on `executor`.
	pub fn configure(&self, executor: &HttpExecutor) {
		for (name, method, path) in self.commands() {
			executor.define_command(name, method, path);
		}
		debug!(target: "wd::driver", prefix = %self.command_prefix, "registered vendor commands");
	}

	/// Sets the browser name and adapts the proxy capability.
	///
	/// Chromium drivers expect `noProxy` as a single host rather than the
	/// W3C list, so only the first entry is kept.
	pub fn prepare_capabilities(&self, capabilities: Capabilities) -> Capabilities {
		let mut capabilities = capabilities.set("browserName", self.browser_name.as_str());
		let Some(mut proxy) = capabilities.get("proxy").cloned() else {
			return capabilities;
		};
		if let Some(object) = proxy.as_object_mut() {
			let first = match object.get("noProxy") {
				Some(Value::Array(hosts)) => Some(hosts.first().filter(|host| !is_empty_host(host)).cloned()),
				_ => None,
			};
			match first {
				Some(Some(host)) => {
					object.insert("noProxy".to_string(), host);
				}
				Some(None) => {
					object.remove("noProxy");
				}
				None => {}
			}
		}
		capabilities.insert("proxy", proxy);
		capabilities
	}

	/// Starts `service` and opens a session on it. The service is killed
	/// when the session quits or fails to start.
	pub fn start_session(&self, service: DriverService, capabilities: Capabilities) -> WebDriver {
		let address = service.start(DEFAULT_START_TIMEOUT);
		let executor = HttpExecutor::deferred(async move { HttpClient::new(&address.await?) });
		self.configure(&executor);

		let on_quit: OnQuit = Box::new(move || service.kill());
		WebDriver::create_session(Arc::new(executor), self.prepare_capabilities(capabilities), Some(on_quit))
	}
}

fn is_empty_host(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(host) => host.is_empty(),
		_ => false,
	}
}

/// Emulated network link. Throughputs are in bytes per second.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConditions {
	#[serde(default)]
	pub offline: bool,
	/// Additional latency in milliseconds.
	#[serde(default)]
	pub latency: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub download_throughput: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub upload_throughput: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
	Granted,
	Denied,
	Prompt,
}

/// Chromium extension commands of a session, from [`WebDriver::chromium`].
///
/// The executor must have been configured with a [`VendorProfile`].
#[derive(Debug)]
pub struct ChromiumCommands<'a> {
	driver: &'a WebDriver,
}

impl WebDriver {
	pub fn chromium(&self) -> ChromiumCommands<'_> {
		ChromiumCommands { driver: self }
	}
}

impl ChromiumCommands<'_> {
	pub async fn launch_app(&self, id: &str) -> Result<()> {
		self.driver.execute_custom(LAUNCH_APP, Params::new().with("id", id)).await.map(drop)
	}

	pub async fn network_conditions(&self) -> Result<NetworkConditions> {
		self.driver.execute_custom(GET_NETWORK_CONDITIONS, Params::new()).await?.deserialize()
	}

	pub async fn set_network_conditions(&self, conditions: &NetworkConditions) -> Result<()> {
		let params = Params::new().with("network_conditions", Arg::serialize(conditions)?);
		self.driver.execute_custom(SET_NETWORK_CONDITIONS, params).await.map(drop)
	}

	pub async fn delete_network_conditions(&self) -> Result<()> {
		self.driver.execute_custom(DELETE_NETWORK_CONDITIONS, Params::new()).await.map(drop)
	}

	/// Sends a DevTools protocol command, discarding its result.
	pub async fn send_devtools_command(&self, cmd: &str, params: Value) -> Result<()> {
		let params = Params::new().with("cmd", cmd).with("params", params);
		self.driver.execute_custom(SEND_DEVTOOLS_COMMAND, params).await.map(drop)
	}

	pub async fn send_and_get_devtools_command(&self, cmd: &str, params: Value) -> Result<RemoteValue> {
		let params = Params::new().with("cmd", cmd).with("params", params);
		self.driver.execute_custom(SEND_AND_GET_DEVTOOLS_COMMAND, params).await
	}

	pub async fn set_permission(&self, name: &str, state: PermissionState) -> Result<()> {
		let params = Params::new()
			.with("descriptor", json!({ "name": name }))
			.with("state", Arg::serialize(&state)?);
		self.driver.execute_custom(SET_PERMISSION, params).await.map(drop)
	}

	/// Allows downloads into `path`, which must be an existing directory.
	pub async fn set_download_path(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		if path.as_os_str().is_empty() {
			return Err(Error::invalid_argument("invalid download path"));
		}
		let is_dir = tokio::fs::metadata(path).await.map(|meta| meta.is_dir()).unwrap_or(false);
		if !is_dir {
			return Err(Error::invalid_argument(format!("not a directory: {}", path.display())));
		}
		self.send_devtools_command(
			"Page.setDownloadBehavior",
			json!({ "behavior": "allow", "downloadPath": path.to_string_lossy() }),
		)
		.await
	}

	pub async fn cast_sinks(&self) -> Result<Vec<Value>> {
		self.driver.execute_custom(GET_CAST_SINKS, Params::new()).await?.deserialize()
	}

	pub async fn set_cast_sink_to_use(&self, sink: &str) -> Result<()> {
		self.sink_command(SET_CAST_SINK_TO_USE, sink).await
	}

	pub async fn start_desktop_mirroring(&self, sink: &str) -> Result<()> {
		self.sink_command(START_CAST_DESKTOP_MIRRORING, sink).await
	}

	pub async fn start_tab_mirroring(&self, sink: &str) -> Result<()> {
		self.sink_command(START_CAST_TAB_MIRRORING, sink).await
	}

	pub async fn cast_issue_message(&self) -> Result<String> {
		let value = self.driver.execute_custom(GET_CAST_ISSUE_MESSAGE, Params::new()).await?;
		Ok(value.as_str().unwrap_or_default().to_string())
	}

	pub async fn stop_casting(&self, sink: &str) -> Result<()> {
		self.sink_command(STOP_CASTING, sink).await
	}

	async fn sink_command(&self, name: &str, sink: &str) -> Result<()> {
		self.driver.execute_custom(name, Params::new().with("sinkName", sink)).await.map(drop)
	}
}

#[cfg(test)]
mod tests {
	use wd_runtime::{CommandName, ErrorKind};

	use super::*;
	use crate::testing::ScriptedExecutor;

	#[test]
	fn test_profiles() {
		let edge = VendorProfile::edge();
		assert_eq!(edge.browser_name, "MicrosoftEdge");
		assert_eq!(VendorProfile::chrome().options_key, "goog:chromeOptions");

		let commands = edge.commands();
		let (_, method, path) = commands.iter().find(|(name, ..)| *name == STOP_CASTING).unwrap();
		assert_eq!(*method, Method::Post);
		assert_eq!(path, "/session/:sessionId/ms/cast/stop_casting");
	}

	#[test]
	fn test_prepare_capabilities_reduces_no_proxy() {
		let profile = VendorProfile::chrome();
		let caps = Capabilities::new().set(
			"proxy",
			json!({"proxyType": "manual", "httpProxy": "proxy:8080", "noProxy": ["localhost", "example.com"]}),
		);
		let caps = profile.prepare_capabilities(caps);
		assert_eq!(caps.get("browserName"), Some(&json!("chrome")));
		assert_eq!(caps.get("proxy").unwrap()["noProxy"], "localhost");

		let caps = Capabilities::new().set("proxy", json!({"proxyType": "manual", "noProxy": []}));
		let caps = profile.prepare_capabilities(caps);
		assert!(caps.get("proxy").unwrap().get("noProxy").is_none());
	}

	#[tokio::test]
	async fn test_commands_send_expected_parameters() {
		let (driver, executor) = ScriptedExecutor::driver();
		let chromium = driver.chromium();

		chromium.set_permission("clipboard-read", PermissionState::Granted).await.unwrap();
		let sent = executor.last(CommandName::from_name(SET_PERMISSION)).unwrap();
		assert_eq!(sent["descriptor"], json!({"name": "clipboard-read"}));
		assert_eq!(sent["state"], "granted");

		chromium
			.set_network_conditions(&NetworkConditions {
				latency: 20,
				download_throughput: Some(1024),
				..Default::default()
			})
			.await
			.unwrap();
		let sent = executor.last(CommandName::from_name(SET_NETWORK_CONDITIONS)).unwrap();
		assert_eq!(
			sent["network_conditions"],
			json!({"offline": false, "latency": 20, "download_throughput": 1024})
		);

		chromium.start_tab_mirroring("Living Room").await.unwrap();
		let sent = executor.last(CommandName::from_name(START_CAST_TAB_MIRRORING)).unwrap();
		assert_eq!(sent["sinkName"], "Living Room");
	}

	#[tokio::test]
	async fn test_set_download_path_requires_directory() {
		let (driver, executor) = ScriptedExecutor::driver();
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("plain.txt");
		std::fs::write(&file, b"x").unwrap();

		let err = driver.chromium().set_download_path(&file).await.unwrap_err();
		assert!(err.is_kind(ErrorKind::InvalidArgument));
		assert!(err.message().starts_with("not a directory: "));

		driver.chromium().set_download_path(dir.path()).await.unwrap();
		let sent = executor.last(CommandName::from_name(SEND_DEVTOOLS_COMMAND)).unwrap();
		assert_eq!(sent["cmd"], "Page.setDownloadBehavior");
		assert_eq!(sent["params"]["behavior"], "allow");
	}
}
