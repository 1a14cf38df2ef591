//! WebAuthn virtual authenticators.
//!
//! A driver holds at most one virtual authenticator at a time; the credential
//! commands address the one added last.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wd_runtime::{CommandName, Error, Result};

use super::WebDriver;
use crate::codec::{Arg, Params};

/// Properties of a virtual authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualAuthenticatorOptions {
	/// `"ctap2"` or `"ctap1/u2f"`.
	pub protocol: String,
	/// `"usb"`, `"nfc"`, `"ble"`, or `"internal"`.
	pub transport: String,
	pub has_resident_key: bool,
	pub has_user_verification: bool,
	pub is_user_consenting: bool,
	pub is_user_verified: bool,
}

impl Default for VirtualAuthenticatorOptions {
	fn default() -> Self {
		Self {
			protocol: "ctap2".to_string(),
			transport: "usb".to_string(),
			has_resident_key: false,
			has_user_verification: false,
			is_user_consenting: true,
			is_user_verified: false,
		}
	}
}

/// A public key credential. Binary fields are base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
	pub credential_id: String,
	pub is_resident_credential: bool,
	pub rp_id: String,
	pub private_key: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_handle: Option<String>,
	#[serde(default)]
	pub sign_count: u64,
}

impl Credential {
	/// A non-resident credential from raw bytes.
	pub fn non_resident(id: &[u8], rp_id: impl Into<String>, private_key: &[u8], sign_count: u64) -> Self {
		Self {
			credential_id: URL_SAFE_NO_PAD.encode(id),
			is_resident_credential: false,
			rp_id: rp_id.into(),
			private_key: URL_SAFE_NO_PAD.encode(private_key),
			user_handle: None,
			sign_count,
		}
	}

	/// A resident credential bound to `user_handle`.
	pub fn resident(
		id: &[u8],
		rp_id: impl Into<String>,
		user_handle: &[u8],
		private_key: &[u8],
		sign_count: u64,
	) -> Self {
		Self {
			is_resident_credential: true,
			user_handle: Some(URL_SAFE_NO_PAD.encode(user_handle)),
			..Self::non_resident(id, rp_id, private_key, sign_count)
		}
	}

	/// The decoded credential id.
	pub fn id_bytes(&self) -> Result<Vec<u8>> {
		URL_SAFE_NO_PAD
			.decode(&self.credential_id)
			.map_err(|e| Error::invalid_argument(format!("Credential id is not base64url: {e}")))
	}
}

impl WebDriver {
	/// The id of the current virtual authenticator, if one was added.
	pub fn virtual_authenticator_id(&self) -> Option<String> {
		self.inner.authenticator_id.lock().clone()
	}

	pub async fn add_virtual_authenticator(&self, options: &VirtualAuthenticatorOptions) -> Result<String> {
		let params = match serde_json::to_value(options)? {
			Value::Object(map) => Params::from(map),
			_ => Params::new(),
		};
		let id: String = self.execute_as(CommandName::AddVirtualAuthenticator, params).await?;
		*self.inner.authenticator_id.lock() = Some(id.clone());
		Ok(id)
	}

	pub async fn remove_virtual_authenticator(&self) -> Result<()> {
		let id = self.require_authenticator()?;
		self.execute_unit(
			CommandName::RemoveVirtualAuthenticator,
			Params::new().with("authenticatorId", id),
		)
		.await?;
		*self.inner.authenticator_id.lock() = None;
		Ok(())
	}

	pub async fn add_credential(&self, credential: &Credential) -> Result<()> {
		let id = self.require_authenticator()?;
		let mut params = match serde_json::to_value(credential)? {
			Value::Object(map) => Params::from(map),
			_ => Params::new(),
		};
		params.set("authenticatorId", id);
		self.execute_unit(CommandName::AddCredential, params).await
	}

	pub async fn get_credentials(&self) -> Result<Vec<Credential>> {
		let id = self.require_authenticator()?;
		let credentials: Option<Vec<Credential>> = self
			.execute_as(CommandName::GetCredentials, Params::new().with("authenticatorId", id))
			.await?;
		Ok(credentials.unwrap_or_default())
	}

	/// Removes a credential by its base64url id.
	pub async fn remove_credential(&self, credential_id: &str) -> Result<()> {
		let id = self.require_authenticator()?;
		let params = Params::new()
			.with("credentialId", credential_id)
			.with("authenticatorId", id);
		self.execute_unit(CommandName::RemoveCredential, params).await
	}

	pub async fn remove_all_credentials(&self) -> Result<()> {
		let id = self.require_authenticator()?;
		self.execute_unit(CommandName::RemoveAllCredentials, Params::new().with("authenticatorId", id))
			.await
	}

	pub async fn set_user_verified(&self, verified: bool) -> Result<()> {
		let id = self.require_authenticator()?;
		let params = Params::new()
			.with("authenticatorId", id)
			.with("isUserVerified", Arg::from(verified));
		self.execute_unit(CommandName::SetUserVerified, params).await
	}

	fn require_authenticator(&self) -> Result<String> {
		self.virtual_authenticator_id()
			.ok_or_else(|| Error::Contract("No virtual authenticator has been added".to_string()))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::testing::ScriptedExecutor;

	#[tokio::test]
	async fn test_credential_commands_use_current_authenticator() {
		let (driver, executor) = ScriptedExecutor::driver();
		executor.respond(CommandName::AddVirtualAuthenticator, Ok(json!("auth-1")));

		assert!(driver.add_credential(&Credential::non_resident(b"id", "example.com", b"key", 0)).await.is_err());

		let id = driver
			.add_virtual_authenticator(&VirtualAuthenticatorOptions::default())
			.await
			.unwrap();
		assert_eq!(id, "auth-1");
		assert_eq!(executor.last(CommandName::AddVirtualAuthenticator).unwrap()["protocol"], "ctap2");

		let credential = Credential::resident(b"\x01\x02", "example.com", b"user", b"key", 3);
		driver.add_credential(&credential).await.unwrap();
		let sent = executor.last(CommandName::AddCredential).unwrap();
		assert_eq!(sent["authenticatorId"], "auth-1");
		assert_eq!(sent["credentialId"], "AQI");
		assert_eq!(sent["userHandle"], "dXNlcg");
		assert_eq!(credential.id_bytes().unwrap(), vec![1, 2]);

		driver.remove_virtual_authenticator().await.unwrap();
		assert_eq!(driver.virtual_authenticator_id(), None);
	}
}
