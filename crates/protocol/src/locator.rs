//! Element location strategies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `{using, value}` element locator.
///
/// Strategies W3C endpoints do not support natively (`id`, `name`,
/// `class name`, `tag name`) are rewritten to CSS selectors at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct By {
	pub using: String,
	pub value: String,
}

impl By {
	/// Creates a locator from a raw strategy name.
	pub fn new(using: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			using: using.into(),
			value: value.into(),
		}
	}

	pub fn css(selector: impl Into<String>) -> Self {
		Self::new("css selector", selector)
	}

	pub fn xpath(xpath: impl Into<String>) -> Self {
		Self::new("xpath", xpath)
	}

	pub fn link_text(text: impl Into<String>) -> Self {
		Self::new("link text", text)
	}

	pub fn partial_link_text(text: impl Into<String>) -> Self {
		Self::new("partial link text", text)
	}

	/// Matches elements whose `id` attribute equals `id`.
	pub fn id(id: &str) -> Self {
		Self::css(format!("*[id=\"{}\"]", escape_css(id)))
	}

	/// Matches elements whose `name` attribute equals `name`.
	pub fn name(name: &str) -> Self {
		Self::css(format!("*[name=\"{}\"]", escape_css(name)))
	}

	/// Matches elements carrying every whitespace-separated class in `name`.
	pub fn class_name(name: &str) -> Self {
		let classes: Vec<String> = name.split_whitespace().map(escape_css).collect();
		Self::css(format!(".{}", classes.join(".")))
	}

	pub fn tag_name(name: &str) -> Self {
		Self::css(escape_css(name))
	}
}

impl fmt::Display for By {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "By({}, {})", self.using, self.value)
	}
}

/// Escapes an identifier for use inside a CSS selector, following `CSS.escape`.
pub fn escape_css(input: &str) -> String {
	let chars: Vec<char> = input.chars().collect();
	let mut out = String::with_capacity(input.len());
	for (i, &c) in chars.iter().enumerate() {
		let code = c as u32;
		if code == 0 {
			out.push('\u{FFFD}');
		} else if (0x1..=0x1f).contains(&code)
			|| code == 0x7f
			|| (i == 0 && c.is_ascii_digit())
			|| (i == 1 && c.is_ascii_digit() && chars[0] == '-')
		{
			out.push_str(&format!("\\{:x} ", code));
		} else if i == 0 && c == '-' && chars.len() == 1 {
			out.push('\\');
			out.push(c);
		} else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
			out.push(c);
		} else {
			out.push('\\');
			out.push(c);
		}
	}
	out
}
