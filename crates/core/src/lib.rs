//! wd: a WebDriver client for Rust
//!
//! Drives browsers through the WebDriver remote protocol. Remote ends speaking
//! the W3C dialect and the older JSON wire dialect are both understood.
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use wd::{By, Capabilities, HttpClient, HttpExecutor, WaitOptions, WebDriver, until};
//!
//! #[tokio::main]
//! async fn main() -> wd::Result<()> {
//!     let client = HttpClient::new("http://localhost:4444/wd/hub")?;
//!     let executor = Arc::new(HttpExecutor::new(client));
//!     let driver = WebDriver::new_session(executor, Capabilities::for_browser("chrome"), None).await?;
//!
//!     driver.get("https://example.com").await?;
//!     let heading = driver
//!         .wait_for_element(until::element_located(By::css("h1")), WaitOptions::with_timeout(Duration::from_secs(5)))
//!         .await?;
//!     println!("{}", heading.text().await?);
//!
//!     driver.quit().await
//! }
//! ```
//!
//! # Layers
//!
//! - [`wd_protocol`]: wire types shared by every layer
//! - [`wd_runtime`]: transport, routing, response classification, driver services
//! - this crate: sessions, element handles, waits, and vendor extensions

mod handle;

pub mod alert;
pub mod codec;
pub mod driver;
pub mod element;
pub mod file_upload;
pub mod locator;
pub mod shadow_root;
pub mod until;
pub mod vendor;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use alert::Alert;
pub use codec::{Arg, Params, RemoteValue, SerializeFuture, WireSerialize};
pub use driver::{
	Credential, Frame, Logs, Margin, Navigation, OnQuit, Options, Orientation, PageSize, PrintOptions, Script,
	TargetLocator, VirtualAuthenticatorOptions, WebDriver, Window,
};
pub use element::WebElement;
pub use file_upload::FileUpload;
pub use locator::{Anchor, CustomLocator, Locator, RelativeBy, SearchContext, locate_with, with_tag_name};
pub use shadow_root::ShadowRoot;
pub use vendor::{ChromiumCommands, NetworkConditions, PermissionState, VendorProfile};
pub use wait::{Condition, ElementCondition, Truthy, WaitOptions, wait_for};
pub use wd_protocol::{
	Browser, By, Capabilities, Cookie, LogEntry, LogLevel, LogType, NewWindow, PageLoadStrategy, ProxyConfig, Rect,
	SameSite, Timeouts, WindowType,
};
pub use wd_runtime::{
	Command, CommandExecutor, CommandName, CommandResponse, DriverService, Error, ErrorKind, HttpClient,
	HttpClientOptions, HttpExecutor, Method, Result, ServiceBuilder, ServiceOptions, Session, WebDriverError,
};
pub use {wd_protocol, wd_runtime};
