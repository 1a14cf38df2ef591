//! Remote command identifiers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! command_names {
	($($(#[$meta:meta])* $variant:ident => $wire:literal,)+) => {
		/// Identifier of a remote command.
		///
		/// Standard commands have a fixed camelCase wire name. Vendor extension
		/// commands registered on an executor use [`CommandName::Custom`].
		#[derive(Debug, Clone, PartialEq, Eq, Hash)]
		pub enum CommandName {
			$($(#[$meta])* $variant,)+
			/// Extension command registered at runtime.
			Custom(String),
		}

		impl CommandName {
			/// Every standard command, in declaration order.
			pub const STANDARD: &'static [CommandName] = &[$(CommandName::$variant,)+];

			/// Returns the wire name of this command.
			pub fn as_str(&self) -> &str {
				match self {
					$(CommandName::$variant => $wire,)+
					CommandName::Custom(name) => name,
				}
			}

			/// Parses a wire name, yielding [`CommandName::Custom`] for unknown names.
			pub fn from_name(name: &str) -> Self {
				match name {
					$($wire => CommandName::$variant,)+
					other => CommandName::Custom(other.to_string()),
				}
			}
		}
	};
}

command_names! {
	GetStatus => "getStatus",
	NewSession => "newSession",
	GetSessions => "getSessions",
	Close => "close",
	Quit => "quit",

	GetCurrentUrl => "getCurrentUrl",
	Get => "get",
	GoBack => "goBack",
	GoForward => "goForward",
	Refresh => "refresh",

	AddCookie => "addCookie",
	GetCookie => "getCookie",
	GetAllCookies => "getCookies",
	DeleteCookie => "deleteCookie",
	DeleteAllCookies => "deleteAllCookies",

	GetActiveElement => "getActiveElement",
	FindElement => "findElement",
	FindElements => "findElements",
	/// Relative locator lookup, emulated with a script.
	FindElementsRelative => "findElementsRelative",
	FindChildElement => "findChildElement",
	FindChildElements => "findChildElements",

	ClearElement => "clearElement",
	ClickElement => "clickElement",
	SendKeysToElement => "sendKeysToElement",

	GetCurrentWindowHandle => "getCurrentWindowHandle",
	GetWindowHandles => "getWindowHandles",
	GetWindowRect => "getWindowRect",
	SetWindowRect => "setWindowRect",
	MaximizeWindow => "maximizeWindow",
	MinimizeWindow => "minimizeWindow",
	FullscreenWindow => "fullscreenWindow",

	SwitchToWindow => "switchToWindow",
	SwitchToNewWindow => "newWindow",
	SwitchToFrame => "switchToFrame",
	SwitchToFrameParent => "switchToFrameParent",
	GetPageSource => "getPageSource",
	GetTitle => "getTitle",

	ExecuteScript => "executeScript",
	ExecuteAsyncScript => "executeAsyncScript",

	GetElementText => "getElementText",
	GetComputedRole => "getAriaRole",
	GetComputedLabel => "getAccessibleName",
	GetElementTagName => "getElementTagName",
	IsElementSelected => "isElementSelected",
	IsElementEnabled => "isElementEnabled",
	/// Visibility check, emulated with a script.
	IsElementDisplayed => "isElementDisplayed",
	GetElementRect => "getElementRect",
	/// Attribute-or-property lookup, emulated with a script.
	GetElementAttribute => "getElementAttribute",
	GetDomAttribute => "getDomAttribute",
	GetElementValueOfCssProperty => "getElementValueOfCssProperty",
	GetElementProperty => "getElementProperty",

	Screenshot => "screenshot",
	TakeElementScreenshot => "takeElementScreenshot",
	PrintPage => "printPage",

	GetTimeout => "getTimeout",
	SetTimeout => "setTimeout",

	AcceptAlert => "acceptAlert",
	DismissAlert => "dismissAlert",
	GetAlertText => "getAlertText",
	SetAlertText => "setAlertValue",

	GetShadowRoot => "getShadowRoot",
	FindElementFromShadowRoot => "findElementFromShadowRoot",
	FindElementsFromShadowRoot => "findElementsFromShadowRoot",

	AddVirtualAuthenticator => "addVirtualAuthenticator",
	RemoveVirtualAuthenticator => "removeVirtualAuthenticator",
	AddCredential => "addCredential",
	GetCredentials => "getCredentials",
	RemoveCredential => "removeCredential",
	RemoveAllCredentials => "removeAllCredentials",
	SetUserVerified => "setUserVerified",

	GetAvailableLogTypes => "getAvailableLogTypes",
	GetLog => "getLog",

	UploadFile => "uploadFile",

	Actions => "actions",
	ClearActions => "clearActions",
}

impl fmt::Display for CommandName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<&str> for CommandName {
	fn from(name: &str) -> Self {
		CommandName::from_name(name)
	}
}

impl From<String> for CommandName {
	fn from(name: String) -> Self {
		CommandName::from_name(&name)
	}
}

impl Serialize for CommandName {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for CommandName {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let name = String::deserialize(deserializer)?;
		Ok(CommandName::from_name(&name))
	}
}
