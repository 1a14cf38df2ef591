//! [`ShadowRoot`]: a handle to an element's shadow root.

use std::fmt;
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use wd_protocol::reference;
use wd_runtime::{CommandName, Error, ErrorKind, Result};

use crate::codec::{Arg, Params, RemoteValue, SerializeFuture, WireSerialize};
use crate::driver::{DriverInner, WebDriver, by_params, expect_element};
use crate::element::WebElement;
use crate::handle::HandleId;
use crate::locator::{Locator, SearchContext, find_custom_element, find_custom_elements};

/// A shadow root. Only element lookups are scoped to it.
#[derive(Clone)]
pub struct ShadowRoot {
	driver: Weak<DriverInner>,
	id: HandleId,
}

impl ShadowRoot {
	pub fn new(driver: &WebDriver, id: impl Into<Arc<str>>) -> Self {
		Self {
			driver: driver.downgrade(),
			id: HandleId::resolved(id),
		}
	}

	pub fn driver(&self) -> Result<WebDriver> {
		WebDriver::upgrade(&self.driver)
			.ok_or_else(|| Error::webdriver(ErrorKind::NoSuchSession, "The driver for this shadow root has been dropped"))
	}

	pub async fn id(&self) -> Result<String> {
		self.id.get().await
	}

	pub fn resolved_id(&self) -> Option<&str> {
		self.id.peek()
	}

	async fn execute(&self, name: CommandName, params: Params) -> Result<RemoteValue> {
		self.driver()?.execute_with(name, params.with("id", self.clone())).await
	}

	pub async fn find_element(&self, locator: impl Into<Locator>) -> Result<WebElement> {
		match locator.into() {
			Locator::By(by) => {
				expect_element(self.execute(CommandName::FindElementFromShadowRoot, by_params(&by)).await?)
			}
			Locator::Custom(custom) => find_custom_element(&custom, SearchContext::ShadowRoot(self.clone())).await,
			Locator::Relative(_) => Err(Error::invalid_argument(
				"Relative locators can only be used from the driver",
			)),
		}
	}

	/// Finds every matching element. No match is an empty list.
	pub async fn find_elements(&self, locator: impl Into<Locator>) -> Result<Vec<WebElement>> {
		match locator.into() {
			Locator::By(by) => match self.execute(CommandName::FindElementsFromShadowRoot, by_params(&by)).await {
				Ok(value) => Ok(value.into_elements()),
				Err(e) if e.is_no_such_element() => Ok(Vec::new()),
				Err(e) => Err(e),
			},
			Locator::Custom(custom) => find_custom_elements(&custom, SearchContext::ShadowRoot(self.clone())).await,
			Locator::Relative(_) => Err(Error::invalid_argument(
				"Relative locators can only be used from the driver",
			)),
		}
	}
}

impl PartialEq for ShadowRoot {
	fn eq(&self, other: &Self) -> bool {
		Weak::ptr_eq(&self.driver, &other.driver)
			&& matches!((self.resolved_id(), other.resolved_id()), (Some(a), Some(b)) if a == b)
	}
}

impl fmt::Debug for ShadowRoot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ShadowRoot").field(&self.id).finish()
	}
}

impl WireSerialize for ShadowRoot {
	fn to_wire(&self) -> SerializeFuture<'_> {
		async move {
			let id = self.id().await?;
			Ok(Arg::Json(reference::shadow_root_reference(&id)))
		}
		.boxed()
	}
}

impl From<ShadowRoot> for Arg {
	fn from(root: ShadowRoot) -> Self {
		Arg::Custom(Box::new(root))
	}
}
