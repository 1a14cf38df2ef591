//! Print-to-PDF options.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
	Portrait,
	Landscape,
}

/// Options for [`WebDriver::print_page`](super::WebDriver::print_page).
///
/// Unset fields are omitted so the remote end applies its defaults. Page and
/// margin sizes are in centimetres.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub orientation: Option<Orientation>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scale: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub background: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<PageSize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub margin: Option<Margin>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub shrink_to_fit: Option<bool>,
	/// Page ranges such as `"1-3"` or `"5"`.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub page_ranges: Vec<String>,
}

impl PrintOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn orientation(mut self, orientation: Orientation) -> Self {
		self.orientation = Some(orientation);
		self
	}

	pub fn scale(mut self, scale: f64) -> Self {
		self.scale = Some(scale);
		self
	}

	pub fn background(mut self, background: bool) -> Self {
		self.background = Some(background);
		self
	}

	pub fn page(mut self, width: f64, height: f64) -> Self {
		self.page = Some(PageSize { width, height });
		self
	}

	pub fn margin(mut self, margin: Margin) -> Self {
		self.margin = Some(margin);
		self
	}

	pub fn shrink_to_fit(mut self, shrink: bool) -> Self {
		self.shrink_to_fit = Some(shrink);
		self
	}

	pub fn page_range(mut self, range: impl Into<String>) -> Self {
		self.page_ranges.push(range.into());
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
	pub width: f64,
	pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Margin {
	pub top: f64,
	pub bottom: f64,
	pub left: f64,
	pub right: f64,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_print_options_omit_unset_fields() {
		let options = PrintOptions::new()
			.orientation(Orientation::Landscape)
			.shrink_to_fit(false)
			.page_range("1-2");
		assert_eq!(
			serde_json::to_value(&options).unwrap(),
			json!({"orientation": "landscape", "shrinkToFit": false, "pageRanges": ["1-2"]})
		);
	}
}
