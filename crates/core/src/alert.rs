//! User prompts opened by `alert()`, `confirm()`, and `prompt()`.

use std::fmt;

use wd_runtime::{CommandName, Result};

use crate::codec::Params;
use crate::driver::WebDriver;

/// An open user prompt.
///
/// The text is read when the alert is obtained through
/// [`TargetLocator::alert`](crate::TargetLocator::alert).
#[derive(Clone)]
pub struct Alert {
	driver: WebDriver,
	text: String,
}

impl Alert {
	pub(crate) fn new(driver: &WebDriver, text: String) -> Self {
		Self {
			driver: driver.clone(),
			text,
		}
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub async fn accept(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::AcceptAlert, Params::new()).await
	}

	pub async fn dismiss(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::DismissAlert, Params::new()).await
	}

	/// Types into a `prompt()` dialog.
	pub async fn send_keys(&self, text: &str) -> Result<()> {
		self.driver
			.execute_unit(CommandName::SetAlertText, Params::new().with("text", text))
			.await
	}
}

impl fmt::Debug for Alert {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Alert").field("text", &self.text).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::testing::ScriptedExecutor;

	#[tokio::test]
	async fn test_alert_round_trip() {
		let (driver, executor) = ScriptedExecutor::driver();
		executor.respond(CommandName::GetAlertText, Ok(json!("Are you sure?")));

		let alert = driver.switch_to().alert().await.unwrap();
		assert_eq!(alert.text(), "Are you sure?");

		alert.send_keys("yes").await.unwrap();
		alert.accept().await.unwrap();

		assert_eq!(executor.last(CommandName::SetAlertText).unwrap()["text"], "yes");
		assert_eq!(executor.count(CommandName::AcceptAlert), 1);
	}
}
