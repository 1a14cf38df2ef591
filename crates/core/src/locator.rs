//! Element locators.
//!
//! Besides plain [`By`] strategies, a lookup can use a [`RelativeBy`]
//! (elements positioned relative to anchors, evaluated in the page) or a
//! [`CustomLocator`] (a caller function given the search context).

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use wd_protocol::By;
use wd_runtime::{Error, Result};

use crate::codec::{Arg, RemoteValue};
use crate::driver::WebDriver;
use crate::element::WebElement;
use crate::shadow_root::ShadowRoot;

/// Default distance, in CSS pixels, for [`RelativeBy::near`].
pub const DEFAULT_NEAR_DISTANCE: u32 = 50;

/// Any supported way of finding elements.
#[derive(Clone)]
pub enum Locator {
	By(By),
	Relative(RelativeBy),
	Custom(CustomLocator),
}

impl From<By> for Locator {
	fn from(by: By) -> Self {
		Locator::By(by)
	}
}

impl From<RelativeBy> for Locator {
	fn from(relative: RelativeBy) -> Self {
		Locator::Relative(relative)
	}
}

impl From<CustomLocator> for Locator {
	fn from(custom: CustomLocator) -> Self {
		Locator::Custom(custom)
	}
}

impl fmt::Display for Locator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Locator::By(by) => fmt::Display::fmt(by, f),
			Locator::Relative(relative) => fmt::Display::fmt(relative, f),
			Locator::Custom(_) => f.write_str("by function()"),
		}
	}
}

impl fmt::Debug for Locator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

/// Where a lookup is scoped.
#[derive(Debug, Clone)]
pub enum SearchContext {
	Driver(WebDriver),
	Element(WebElement),
	ShadowRoot(ShadowRoot),
}

impl SearchContext {
	pub fn driver(&self) -> Result<WebDriver> {
		match self {
			SearchContext::Driver(driver) => Ok(driver.clone()),
			SearchContext::Element(element) => element.driver(),
			SearchContext::ShadowRoot(root) => root.driver(),
		}
	}

	pub async fn find_element(&self, locator: impl Into<Locator>) -> Result<WebElement> {
		match self {
			SearchContext::Driver(driver) => driver.find_element(locator).await,
			SearchContext::Element(element) => element.find_element(locator).await,
			SearchContext::ShadowRoot(root) => root.find_element(locator).await,
		}
	}

	pub async fn find_elements(&self, locator: impl Into<Locator>) -> Result<Vec<WebElement>> {
		match self {
			SearchContext::Driver(driver) => driver.find_elements(locator).await,
			SearchContext::Element(element) => element.find_elements(locator).await,
			SearchContext::ShadowRoot(root) => root.find_elements(locator).await,
		}
	}
}

type LocatorFn = dyn Fn(SearchContext) -> BoxFuture<'static, Result<RemoteValue>> + Send + Sync;

/// A caller-supplied lookup.
///
/// The function may yield an element, or a list whose element entries are
/// taken; a single-element lookup uses the first entry.
#[derive(Clone)]
pub struct CustomLocator(Arc<LocatorFn>);

impl CustomLocator {
	pub fn new<F, Fut>(f: F) -> Self
	where
		F: Fn(SearchContext) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<RemoteValue>> + Send + 'static,
	{
		Self(Arc::new(move |context| f(context).boxed()))
	}

	async fn call(&self, context: SearchContext) -> Result<RemoteValue> {
		(self.0)(context).await
	}
}

pub(crate) async fn find_custom_element(locator: &CustomLocator, context: SearchContext) -> Result<WebElement> {
	let first = match locator.call(context).await? {
		RemoteValue::Array(items) => items.into_iter().next().unwrap_or_default(),
		other => other,
	};
	first
		.into_element()
		.ok_or_else(|| Error::Contract("Custom locator did not return a WebElement".to_string()))
}

pub(crate) async fn find_custom_elements(locator: &CustomLocator, context: SearchContext) -> Result<Vec<WebElement>> {
	Ok(match locator.call(context).await? {
		RemoteValue::Element(element) => vec![element],
		other => other.into_elements(),
	})
}

/// Reference point for a relative filter.
#[derive(Debug, Clone)]
pub enum Anchor {
	Element(WebElement),
	/// First element matching the locator when the page evaluates the query.
	By(By),
}

impl From<WebElement> for Anchor {
	fn from(element: WebElement) -> Self {
		Anchor::Element(element)
	}
}

impl From<&WebElement> for Anchor {
	fn from(element: &WebElement) -> Self {
		Anchor::Element(element.clone())
	}
}

impl From<By> for Anchor {
	fn from(by: By) -> Self {
		Anchor::By(by)
	}
}

impl Anchor {
	fn to_arg(&self) -> Arg {
		match self {
			Anchor::Element(element) => Arg::from(element),
			Anchor::By(by) => by_object(by),
		}
	}
}

#[derive(Debug, Clone)]
struct Filter {
	kind: &'static str,
	anchor: Anchor,
	distance: Option<u32>,
}

/// Elements matching a root locator, narrowed by their position relative to
/// anchors. Results are ordered by distance from the first anchor.
#[derive(Debug, Clone)]
pub struct RelativeBy {
	root: By,
	filters: Vec<Filter>,
}

/// Starts a relative locator over elements with the given tag.
pub fn with_tag_name(tag: &str) -> RelativeBy {
	locate_with(By::tag_name(tag))
}

/// Starts a relative locator over elements matching `by`.
pub fn locate_with(by: By) -> RelativeBy {
	RelativeBy { root: by, filters: Vec::new() }
}

impl RelativeBy {
	fn filter(mut self, kind: &'static str, anchor: impl Into<Anchor>, distance: Option<u32>) -> Self {
		self.filters.push(Filter {
			kind,
			anchor: anchor.into(),
			distance,
		});
		self
	}

	pub fn above(self, anchor: impl Into<Anchor>) -> Self {
		self.filter("above", anchor, None)
	}

	pub fn below(self, anchor: impl Into<Anchor>) -> Self {
		self.filter("below", anchor, None)
	}

	pub fn to_left_of(self, anchor: impl Into<Anchor>) -> Self {
		self.filter("left", anchor, None)
	}

	pub fn to_right_of(self, anchor: impl Into<Anchor>) -> Self {
		self.filter("right", anchor, None)
	}

	/// Above the anchor and overlapping it horizontally.
	pub fn straight_above(self, anchor: impl Into<Anchor>) -> Self {
		self.filter("straightAbove", anchor, None)
	}

	pub fn straight_below(self, anchor: impl Into<Anchor>) -> Self {
		self.filter("straightBelow", anchor, None)
	}

	pub fn straight_left_of(self, anchor: impl Into<Anchor>) -> Self {
		self.filter("straightLeft", anchor, None)
	}

	pub fn straight_right_of(self, anchor: impl Into<Anchor>) -> Self {
		self.filter("straightRight", anchor, None)
	}

	/// Within [`DEFAULT_NEAR_DISTANCE`] pixels of the anchor.
	pub fn near(self, anchor: impl Into<Anchor>) -> Self {
		self.near_within(anchor, DEFAULT_NEAR_DISTANCE)
	}

	pub fn near_within(self, anchor: impl Into<Anchor>, distance: u32) -> Self {
		self.filter("near", anchor, Some(distance))
	}

	/// The `{relative: {root, filters}}` query evaluated in the page.
	pub(crate) fn to_arg(&self) -> Arg {
		let filters: Vec<Arg> = self
			.filters
			.iter()
			.map(|filter| {
				let mut args = vec![filter.anchor.to_arg()];
				if let Some(distance) = filter.distance {
					args.push(Arg::from(distance));
				}
				Arg::map([("kind", Arg::from(filter.kind)), ("args", Arg::from(args))])
			})
			.collect();

		let query = Arg::map([("root", by_object(&self.root)), ("filters", Arg::from(filters))]);
		Arg::map([("relative", query)])
	}
}

impl fmt::Display for RelativeBy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RelativeBy({}", self.root)?;
		for filter in &self.filters {
			write!(f, ", {}", filter.kind)?;
		}
		f.write_str(")")
	}
}

fn by_object(by: &By) -> Arg {
	Arg::map([(by.using.as_str(), Arg::from(by.value.as_str()))])
}
