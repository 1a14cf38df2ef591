//! Browser proxy configuration carried in the `proxy` capability.

use serde::{Deserialize, Serialize};

/// Proxy settings the browser should use.
///
/// This configures the browser under automation, not the HTTP client talking
/// to the remote end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "proxyType", rename_all = "lowercase")]
pub enum ProxyConfig {
	/// Connect directly, bypassing any proxy.
	Direct,
	/// Use the operating system's proxy settings.
	System,
	/// Detect proxy settings automatically.
	Autodetect,
	/// Fetch a PAC file from the given URL.
	Pac {
		#[serde(rename = "proxyAutoconfigUrl")]
		url: String,
	},
	/// Explicit per-protocol proxies.
	Manual(ManualProxy),
}

/// Explicit per-protocol proxy hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualProxy {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ftp_proxy: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub http_proxy: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ssl_proxy: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub socks_proxy: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub socks_version: Option<u8>,
	/// Hosts that bypass the proxy.
	#[serde(skip_serializing_if = "Vec::is_empty", default)]
	pub no_proxy: Vec<String>,
}

impl ProxyConfig {
	pub fn direct() -> Self {
		ProxyConfig::Direct
	}

	pub fn system() -> Self {
		ProxyConfig::System
	}

	pub fn pac(url: impl Into<String>) -> Self {
		ProxyConfig::Pac { url: url.into() }
	}

	/// Manual proxy with the same host for HTTP and HTTPS traffic.
	pub fn http(host: impl Into<String>) -> Self {
		let host = host.into();
		ProxyConfig::Manual(ManualProxy {
			http_proxy: Some(host.clone()),
			ssl_proxy: Some(host),
			..ManualProxy::default()
		})
	}

	/// SOCKS proxy at `host`, speaking `version` (4 or 5).
	pub fn socks(host: impl Into<String>, version: u8) -> Self {
		ProxyConfig::Manual(ManualProxy {
			socks_proxy: Some(host.into()),
			socks_version: Some(version),
			..ManualProxy::default()
		})
	}

	/// Adds hosts that bypass a manual proxy. Ignored for other proxy types.
	pub fn bypass<I, S>(mut self, hosts: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		if let ProxyConfig::Manual(manual) = &mut self {
			manual.no_proxy.extend(hosts.into_iter().map(Into::into));
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_simple_types() {
		assert_eq!(serde_json::to_value(ProxyConfig::direct()).unwrap(), json!({"proxyType": "direct"}));
		assert_eq!(serde_json::to_value(ProxyConfig::system()).unwrap(), json!({"proxyType": "system"}));
	}

	#[test]
	fn test_pac() {
		let value = serde_json::to_value(ProxyConfig::pac("http://proxy/pac")).unwrap();
		assert_eq!(value, json!({"proxyType": "pac", "proxyAutoconfigUrl": "http://proxy/pac"}));
	}

	#[test]
	fn test_manual_with_bypass() {
		let config = ProxyConfig::http("proxy:8080").bypass(["localhost", "127.0.0.1"]);
		let value = serde_json::to_value(config).unwrap();
		assert_eq!(
			value,
			json!({
				"proxyType": "manual",
				"httpProxy": "proxy:8080",
				"sslProxy": "proxy:8080",
				"noProxy": ["localhost", "127.0.0.1"],
			})
		);
	}

	#[test]
	fn test_socks() {
		let value = serde_json::to_value(ProxyConfig::socks("socks:1080", 5)).unwrap();
		assert_eq!(value, json!({"proxyType": "manual", "socksProxy": "socks:1080", "socksVersion": 5}));
	}
}
