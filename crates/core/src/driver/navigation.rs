//! Browser history and page loads.

use wd_runtime::{CommandName, Result};

use super::WebDriver;
use crate::codec::Params;

/// Navigation commands for the current top-level browsing context.
#[derive(Debug, Clone, Copy)]
pub struct Navigation<'a> {
	driver: &'a WebDriver,
}

impl<'a> Navigation<'a> {
	pub(crate) fn new(driver: &'a WebDriver) -> Self {
		Self { driver }
	}

	/// Loads `url` and waits for the page load strategy to be satisfied.
	pub async fn to(&self, url: &str) -> Result<()> {
		self.driver.execute_unit(CommandName::Get, Params::new().with("url", url)).await
	}

	pub async fn back(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::GoBack, Params::new()).await
	}

	pub async fn forward(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::GoForward, Params::new()).await
	}

	pub async fn refresh(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::Refresh, Params::new()).await
	}
}
