//! [`WebElement`]: a handle to a DOM element in a remote session.

use std::fmt;
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use wd_protocol::{Rect, reference};
use wd_runtime::{CommandName, Error, ErrorKind, Result};

use crate::codec::{Arg, Params, RemoteValue, SerializeFuture, WireSerialize};
use crate::driver::{DriverInner, WebDriver, by_params, expect_element};
use crate::handle::HandleId;
use crate::locator::{Locator, SearchContext, find_custom_element, find_custom_elements};
use crate::shadow_root::ShadowRoot;

const SUBMIT_SCRIPT: &str = "\
	var form = arguments[0];\n\
	while (form.nodeName != \"FORM\" && form.parentNode) {\n\
	  form = form.parentNode;\n\
	}\n\
	if (!form) { throw Error('Unable to find containing form element'); }\n\
	if (!form.ownerDocument) { throw Error('Unable to find owning document'); }\n\
	var e = form.ownerDocument.createEvent('Event');\n\
	e.initEvent('submit', true, true);\n\
	if (form.dispatchEvent(e)) { HTMLFormElement.prototype.submit.call(form) }";

/// A DOM element.
///
/// The handle does not keep its session alive. Commands on an element whose
/// driver has been dropped fail with [`ErrorKind::NoSuchSession`].
#[derive(Clone)]
pub struct WebElement {
	driver: Weak<DriverInner>,
	id: HandleId,
}

impl WebElement {
	pub fn new(driver: &WebDriver, id: impl Into<Arc<str>>) -> Self {
		Self::from_handle(driver, HandleId::resolved(id))
	}

	pub(crate) fn from_handle(driver: &WebDriver, id: HandleId) -> Self {
		Self {
			driver: driver.downgrade(),
			id,
		}
	}

	/// The driver that produced this element.
	pub fn driver(&self) -> Result<WebDriver> {
		WebDriver::upgrade(&self.driver)
			.ok_or_else(|| Error::webdriver(ErrorKind::NoSuchSession, "The driver for this element has been dropped"))
	}

	/// The element's remote id, waiting for a deferred lookup if needed.
	pub async fn id(&self) -> Result<String> {
		self.id.get().await
	}

	/// The remote id, if it is already known.
	pub fn resolved_id(&self) -> Option<&str> {
		self.id.peek()
	}

	/// Returns true if both handles refer to the same remote element.
	pub async fn equals(&self, other: &WebElement) -> Result<bool> {
		if !Weak::ptr_eq(&self.driver, &other.driver) {
			return Ok(false);
		}
		Ok(self.id().await? == other.id().await?)
	}

	async fn execute(&self, name: CommandName, params: Params) -> Result<RemoteValue> {
		self.driver()?.execute_with(name, params.with("id", self.clone())).await
	}

	async fn execute_as<T: serde::de::DeserializeOwned>(&self, name: CommandName, params: Params) -> Result<T> {
		self.execute(name, params).await?.deserialize()
	}

	/// Finds the first descendant matching `locator`.
	pub async fn find_element(&self, locator: impl Into<Locator>) -> Result<WebElement> {
		match locator.into() {
			Locator::By(by) => expect_element(self.execute(CommandName::FindChildElement, by_params(&by)).await?),
			Locator::Custom(custom) => find_custom_element(&custom, SearchContext::Element(self.clone())).await,
			Locator::Relative(_) => Err(relative_unsupported()),
		}
	}

	/// Element handle whose lookup runs on first use.
	pub fn find_element_deferred(&self, locator: impl Into<Locator>) -> WebElement {
		let parent = self.clone();
		let locator = locator.into();
		let id = HandleId::pending(async move { parent.find_element(locator).await?.id().await });
		Self {
			driver: self.driver.clone(),
			id,
		}
	}

	/// Finds every descendant matching `locator`. No match is an empty list.
	pub async fn find_elements(&self, locator: impl Into<Locator>) -> Result<Vec<WebElement>> {
		match locator.into() {
			Locator::By(by) => match self.execute(CommandName::FindChildElements, by_params(&by)).await {
				Ok(value) => Ok(value.into_elements()),
				Err(e) if e.is_no_such_element() => Ok(Vec::new()),
				Err(e) => Err(e),
			},
			Locator::Custom(custom) => find_custom_elements(&custom, SearchContext::Element(self.clone())).await,
			Locator::Relative(_) => Err(relative_unsupported()),
		}
	}

	pub async fn click(&self) -> Result<()> {
		self.execute(CommandName::ClickElement, Params::new()).await.map(drop)
	}

	/// Types `keys` into the element. Pieces are concatenated; special keys
	/// are private-use characters such as `"\u{E007}"` (Enter).
	pub async fn send_keys<I, S>(&self, keys: I) -> Result<()>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let text: String = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
		let chars: Vec<String> = text.chars().map(String::from).collect();
		let params = Params::new().with("text", text).with("value", chars);
		self.execute(CommandName::SendKeysToElement, params).await.map(drop)
	}

	pub async fn clear(&self) -> Result<()> {
		self.execute(CommandName::ClearElement, Params::new()).await.map(drop)
	}

	pub async fn tag_name(&self) -> Result<String> {
		self.execute_as(CommandName::GetElementTagName, Params::new()).await
	}

	/// Computed value of a CSS property.
	pub async fn css_value(&self, property: &str) -> Result<String> {
		self.execute_as(CommandName::GetElementValueOfCssProperty, Params::new().with("propertyName", property))
			.await
	}

	/// Attribute value, falling back to the property of the same name.
	///
	/// Boolean attributes yield `"true"` or `None`.
	pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
		let value = self.execute(CommandName::GetElementAttribute, Params::new().with("name", name)).await?;
		Ok(match value {
			RemoteValue::Null => None,
			RemoteValue::String(s) => Some(s),
			other => Some(other.into_json().to_string()),
		})
	}

	/// Attribute value as written in the DOM, without property fallback.
	pub async fn dom_attribute(&self, name: &str) -> Result<Option<String>> {
		self.execute_as(CommandName::GetDomAttribute, Params::new().with("name", name)).await
	}

	pub async fn property(&self, name: &str) -> Result<RemoteValue> {
		self.execute(CommandName::GetElementProperty, Params::new().with("name", name)).await
	}

	pub async fn shadow_root(&self) -> Result<ShadowRoot> {
		let value = self.execute(CommandName::GetShadowRoot, Params::new()).await?;
		let kind = value.type_name();
		value
			.into_shadow_root()
			.ok_or_else(|| Error::unknown(format!("Expected a shadow root reference, got {kind}")))
	}

	/// Visible text, as rendered.
	pub async fn text(&self) -> Result<String> {
		self.execute_as(CommandName::GetElementText, Params::new()).await
	}

	pub async fn aria_role(&self) -> Result<String> {
		self.execute_as(CommandName::GetComputedRole, Params::new()).await
	}

	pub async fn accessible_name(&self) -> Result<String> {
		self.execute_as(CommandName::GetComputedLabel, Params::new()).await
	}

	pub async fn rect(&self) -> Result<Rect> {
		self.execute_as(CommandName::GetElementRect, Params::new()).await
	}

	pub async fn is_enabled(&self) -> Result<bool> {
		self.execute_as(CommandName::IsElementEnabled, Params::new()).await
	}

	pub async fn is_selected(&self) -> Result<bool> {
		self.execute_as(CommandName::IsElementSelected, Params::new()).await
	}

	pub async fn is_displayed(&self) -> Result<bool> {
		self.execute_as(CommandName::IsElementDisplayed, Params::new()).await
	}

	/// Screenshot of the element's bounding box as base64-encoded PNG.
	pub async fn take_screenshot(&self) -> Result<String> {
		self.execute_as(CommandName::TakeElementScreenshot, Params::new()).await
	}

	/// Submits the form containing this element.
	pub async fn submit(&self) -> Result<()> {
		let driver = self.driver()?;
		driver
			.execute_script(SUBMIT_SCRIPT, vec![Arg::from(self.clone())])
			.await
			.map(drop)
	}
}

fn relative_unsupported() -> Error {
	Error::invalid_argument("Relative locators can only be used from the driver")
}

impl PartialEq for WebElement {
	/// Same owner and same resolved id. Handles still pending compare unequal.
	fn eq(&self, other: &Self) -> bool {
		if !Weak::ptr_eq(&self.driver, &other.driver) {
			return false;
		}
		match (self.resolved_id(), other.resolved_id()) {
			(Some(a), Some(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Debug for WebElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("WebElement").field(&self.id).finish()
	}
}

impl WireSerialize for WebElement {
	fn to_wire(&self) -> SerializeFuture<'_> {
		async move {
			let id = self.id().await?;
			Ok(Arg::Json(reference::element_reference(&id)))
		}
		.boxed()
	}
}

impl From<WebElement> for Arg {
	fn from(element: WebElement) -> Self {
		Arg::Custom(Box::new(element))
	}
}

impl From<&WebElement> for Arg {
	fn from(element: &WebElement) -> Self {
		Arg::Custom(Box::new(element.clone()))
	}
}
