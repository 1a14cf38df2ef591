//! Switching between frames, windows, and alerts.

use serde_json::Value;
use wd_protocol::{By, NewWindow, WindowType};
use wd_runtime::{CommandName, Result};

use super::{WebDriver, expect_element};
use crate::alert::Alert;
use crate::codec::{Arg, Params};
use crate::element::WebElement;

/// Target of [`TargetLocator::frame`].
#[derive(Debug, Clone)]
pub enum Frame {
	/// The top-level browsing context.
	Top,
	/// Zero-based index into `window.frames`.
	Index(u16),
	/// A frame or iframe element.
	Element(WebElement),
	/// Matched against the `id` attribute first, then `name`.
	NameOrId(String),
}

impl From<u16> for Frame {
	fn from(index: u16) -> Self {
		Frame::Index(index)
	}
}

impl From<WebElement> for Frame {
	fn from(element: WebElement) -> Self {
		Frame::Element(element)
	}
}

impl From<&str> for Frame {
	fn from(name: &str) -> Self {
		Frame::NameOrId(name.to_string())
	}
}

/// Changes which browsing context or dialog commands are sent to.
#[derive(Debug, Clone, Copy)]
pub struct TargetLocator<'a> {
	driver: &'a WebDriver,
}

impl<'a> TargetLocator<'a> {
	pub(crate) fn new(driver: &'a WebDriver) -> Self {
		Self { driver }
	}

	/// The focused element, or `body` when nothing has focus.
	pub async fn active_element(&self) -> Result<WebElement> {
		let value = self.driver.execute_with(CommandName::GetActiveElement, Params::new()).await?;
		expect_element(value)
	}

	/// Switches to the top-level browsing context.
	pub async fn default_content(&self) -> Result<()> {
		self.frame(Frame::Top).await
	}

	pub async fn frame(&self, frame: impl Into<Frame>) -> Result<()> {
		let id = match frame.into() {
			Frame::Top => Arg::Json(Value::Null),
			Frame::Index(index) => Arg::from(u32::from(index)),
			Frame::Element(element) => Arg::from(element),
			Frame::NameOrId(name) => {
				let element = match self.driver.find_element(By::id(&name)).await {
					Ok(element) => element,
					Err(_) => self.driver.find_element(By::name(&name)).await?,
				};
				Arg::from(element)
			}
		};
		self.driver
			.execute_unit(CommandName::SwitchToFrame, Params::new().with("id", id))
			.await
	}

	pub async fn parent_frame(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::SwitchToFrameParent, Params::new()).await
	}

	/// Switches to a window by handle; legacy remote ends also accept its name.
	pub async fn window(&self, name_or_handle: &str) -> Result<()> {
		let params = Params::new()
			.with("name", name_or_handle)
			.with("handle", name_or_handle);
		self.driver.execute_unit(CommandName::SwitchToWindow, params).await
	}

	/// Opens a tab or window and switches to it.
	pub async fn new_window(&self, kind: WindowType) -> Result<NewWindow> {
		let created: NewWindow = self
			.driver
			.execute_as(CommandName::SwitchToNewWindow, Params::new().with("type", Arg::serialize(&kind)?))
			.await?;
		self.window(&created.handle).await?;
		Ok(created)
	}

	/// The open user prompt. Fails with `NoSuchAlert` if there is none.
	pub async fn alert(&self) -> Result<Alert> {
		let text: Option<String> = self.driver.execute_as(CommandName::GetAlertText, Params::new()).await?;
		Ok(Alert::new(self.driver, text.unwrap_or_default()))
	}
}
