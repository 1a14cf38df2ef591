//! Session settings: cookies, timeouts, window geometry, and log buffers.

use serde_json::Value;
use tracing::debug;
use wd_protocol::{Cookie, LogEntry, Rect, SameSite, Timeouts};
use wd_runtime::{CommandName, Error, ErrorKind, Result};

use super::WebDriver;
use crate::codec::{Arg, Params};

/// Cookie and timeout management for the session.
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
	driver: &'a WebDriver,
}

impl<'a> Options<'a> {
	pub(crate) fn new(driver: &'a WebDriver) -> Self {
		Self { driver }
	}

	/// Adds a cookie to the current page's domain.
	///
	/// Names may not contain `;` or `=`, values may not contain `;`, and a
	/// `SameSite=None` cookie must be secure.
	pub async fn add_cookie(&self, cookie: &Cookie) -> Result<()> {
		if cookie.name.contains([';', '=']) {
			return Err(Error::invalid_argument(format!("Invalid cookie name \"{}\"", cookie.name)));
		}
		if cookie.value.contains(';') {
			return Err(Error::invalid_argument(format!("Invalid cookie value \"{}\"", cookie.value)));
		}
		if cookie.same_site == Some(SameSite::None) && !cookie.secure {
			return Err(Error::invalid_argument(
				"Invalid cookie configuration: SameSite=None must be Secure",
			));
		}

		self.driver
			.execute_unit(CommandName::AddCookie, Params::new().with("cookie", Arg::serialize(cookie)?))
			.await
	}

	pub async fn get_cookies(&self) -> Result<Vec<Cookie>> {
		let cookies: Option<Vec<Cookie>> = self.driver.execute_as(CommandName::GetAllCookies, Params::new()).await?;
		Ok(cookies.unwrap_or_default())
	}

	/// The named cookie, if it is visible to the current page.
	///
	/// Remote ends without a single-cookie endpoint are served by scanning
	/// every cookie.
	pub async fn get_cookie(&self, name: &str) -> Result<Option<Cookie>> {
		let result = self
			.driver
			.execute_raw(CommandName::GetCookie, Params::new().with("name", name))
			.await;

		match result {
			Ok(Value::Null) => Ok(None),
			Ok(value) => Ok(Some(serde_json::from_value(value)?)),
			Err(e) if e.is_kind(ErrorKind::NoSuchCookie) => Ok(None),
			Err(e) if e.is_kind(ErrorKind::UnknownCommand) || e.is_kind(ErrorKind::UnsupportedOperation) => {
				debug!(target: "wd::driver", "get cookie unsupported, scanning all cookies");
				let cookies = self.get_cookies().await?;
				Ok(cookies.into_iter().find(|cookie| cookie.name == name))
			}
			Err(e) => Err(e),
		}
	}

	pub async fn delete_cookie(&self, name: &str) -> Result<()> {
		self.driver
			.execute_unit(CommandName::DeleteCookie, Params::new().with("name", name))
			.await
	}

	pub async fn delete_all_cookies(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::DeleteAllCookies, Params::new()).await
	}

	pub async fn get_timeouts(&self) -> Result<Timeouts> {
		self.driver.execute_as(CommandName::GetTimeout, Params::new()).await
	}

	/// Sets the given timeouts; unset fields are left alone.
	///
	/// If the remote end rejects the W3C form, each timeout is sent again in
	/// the legacy `{type, ms}` form.
	pub async fn set_timeouts(&self, timeouts: Timeouts) -> Result<()> {
		if timeouts.is_empty() {
			return Err(Error::Contract("no timeouts specified".to_string()));
		}

		let params = match serde_json::to_value(timeouts)? {
			Value::Object(map) => Params::from(map),
			_ => Params::new(),
		};

		match self.driver.execute_unit(CommandName::SetTimeout, params).await {
			Ok(()) => Ok(()),
			Err(e) => {
				debug!(target: "wd::driver", error = %e, "set timeouts failed, retrying in legacy form");
				let legacy = [
					("script", timeouts.script),
					("implicit", timeouts.implicit),
					("page load", timeouts.page_load),
				];
				for (kind, ms) in legacy {
					if let Some(ms) = ms {
						let params = Params::new().with("type", kind).with("ms", ms);
						self.driver.execute_unit(CommandName::SetTimeout, params).await?;
					}
				}
				Ok(())
			}
		}
	}

	pub fn window(&self) -> Window<'a> {
		Window { driver: self.driver }
	}

	pub fn logs(&self) -> Logs<'a> {
		Logs { driver: self.driver }
	}
}

/// Geometry of the current top-level window.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
	driver: &'a WebDriver,
}

impl Window<'_> {
	pub async fn rect(&self) -> Result<Rect> {
		self.driver.execute_as(CommandName::GetWindowRect, Params::new()).await
	}

	/// Moves and resizes the window, returning the rect the remote end applied.
	///
	/// `None` fields keep their current value.
	pub async fn set_rect(
		&self,
		x: Option<f64>,
		y: Option<f64>,
		width: Option<f64>,
		height: Option<f64>,
	) -> Result<Rect> {
		let mut params = Params::new();
		for (key, value) in [("x", x), ("y", y), ("width", width), ("height", height)] {
			if let Some(value) = value {
				params.set(key, value);
			}
		}
		self.driver.execute_as(CommandName::SetWindowRect, params).await
	}

	pub async fn maximize(&self) -> Result<()> {
		self.driver
			.execute_unit(CommandName::MaximizeWindow, Params::new().with("windowHandle", "current"))
			.await
	}

	pub async fn minimize(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::MinimizeWindow, Params::new()).await
	}

	pub async fn fullscreen(&self) -> Result<()> {
		self.driver.execute_unit(CommandName::FullscreenWindow, Params::new()).await
	}
}

/// Remote log buffers. Not part of W3C; support varies by remote end.
#[derive(Debug, Clone, Copy)]
pub struct Logs<'a> {
	driver: &'a WebDriver,
}

impl Logs<'_> {
	/// Drains the entries of the named buffer, such as
	/// [`LogType::BROWSER`](wd_protocol::LogType::BROWSER).
	pub async fn get(&self, kind: &str) -> Result<Vec<LogEntry>> {
		let entries: Option<Vec<LogEntry>> = self
			.driver
			.execute_as(CommandName::GetLog, Params::new().with("type", kind))
			.await?;
		Ok(entries.unwrap_or_default())
	}

	pub async fn available_log_types(&self) -> Result<Vec<String>> {
		let kinds: Option<Vec<String>> = self
			.driver
			.execute_as(CommandName::GetAvailableLogTypes, Params::new())
			.await?;
		Ok(kinds.unwrap_or_default())
	}
}
