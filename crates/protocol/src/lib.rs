//! WebDriver wire types
//!
//! Plain data shared by the runtime and the public client crate:
//!
//! - [`CommandName`]: the stable identifiers of every standard remote command
//! - [`reference`]: the reserved keys that mark element and shadow-root handles
//! - [`Capabilities`]: negotiated session properties and W3C filtering
//! - Locator, cookie, rect, timeout, and log payloads
//!
//! Nothing in here performs I/O.

pub mod capabilities;
pub mod command;
pub mod locator;
pub mod proxy;
pub mod reference;
pub mod types;

pub use capabilities::{Browser, Capabilities, PageLoadStrategy, W3C_CAPABILITY_NAMES};
pub use command::CommandName;
pub use locator::By;
pub use proxy::ProxyConfig;
pub use reference::{ELEMENT_KEY, LEGACY_ELEMENT_KEY, SHADOW_ROOT_KEY};
pub use types::{Cookie, LogEntry, LogLevel, LogType, NewWindow, Rect, SameSite, Timeouts, WindowType};
