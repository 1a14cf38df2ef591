//! Stock wait conditions.
//!
//! ```ignore
//! driver.wait(until::title_is("Done"), WaitOptions::with_timeout(Duration::from_secs(2))).await?;
//! ```

use std::future::Future;

use regex::Regex;
use serde_json::Value;
use wd_runtime::{ErrorKind, Result};

use crate::alert::Alert;
use crate::codec::RemoteValue;
use crate::driver::Frame;
use crate::element::WebElement;
use crate::locator::Locator;
use crate::wait::{Condition, ElementCondition};

fn quoted(text: &str) -> String {
	Value::from(text).to_string()
}

pub fn title_is(title: &str) -> Condition<bool> {
	let expected = title.to_string();
	Condition::new(&format!("for title to be {}", quoted(title)), move |driver| {
		let expected = expected.clone();
		async move { Ok(driver.title().await? == expected) }
	})
}

pub fn title_contains(substr: &str) -> Condition<bool> {
	let expected = substr.to_string();
	Condition::new(&format!("for title to contain {}", quoted(substr)), move |driver| {
		let expected = expected.clone();
		async move { Ok(driver.title().await?.contains(&expected)) }
	})
}

pub fn title_matches(regex: Regex) -> Condition<bool> {
	Condition::new(&format!("for title to match /{}/", regex.as_str()), move |driver| {
		let regex = regex.clone();
		async move { Ok(regex.is_match(&driver.title().await?)) }
	})
}

pub fn url_is(url: &str) -> Condition<bool> {
	let expected = url.to_string();
	Condition::new(&format!("for URL to be {}", quoted(url)), move |driver| {
		let expected = expected.clone();
		async move { Ok(driver.current_url().await? == expected) }
	})
}

pub fn url_contains(substr: &str) -> Condition<bool> {
	let expected = substr.to_string();
	Condition::new(&format!("for URL to contain {}", quoted(substr)), move |driver| {
		let expected = expected.clone();
		async move { Ok(driver.current_url().await?.contains(&expected)) }
	})
}

pub fn url_matches(regex: Regex) -> Condition<bool> {
	Condition::new(&format!("for URL to match /{}/", regex.as_str()), move |driver| {
		let regex = regex.clone();
		async move { Ok(regex.is_match(&driver.current_url().await?)) }
	})
}

/// Resolves with the open alert.
pub fn alert_is_present() -> Condition<Option<Alert>> {
	Condition::new("for alert to be present", |driver| async move {
		match driver.switch_to().alert().await {
			Ok(alert) => Ok(Some(alert)),
			Err(e) if e.is_kind(ErrorKind::NoSuchAlert) => Ok(None),
			// geckodriver reports a missing alert this way
			Err(e) if e.message() == "can't convert null to object" => Ok(None),
			Err(e) => Err(e),
		}
	})
}

/// Switches to `frame` as soon as it is available.
pub fn able_to_switch_to_frame(frame: impl Into<Frame>) -> Condition<bool> {
	let frame = frame.into();
	Condition::new("to be able to switch to frame", move |driver| {
		let frame = frame.clone();
		async move {
			match driver.switch_to().frame(frame).await {
				Ok(()) => Ok(true),
				Err(e) if e.is_kind(ErrorKind::NoSuchFrame) => Ok(false),
				Err(e) => Err(e),
			}
		}
	})
}

/// Switches to the first frame element matching `locator` once one exists.
pub fn able_to_switch_to_frame_located(locator: impl Into<Locator>) -> Condition<bool> {
	let locator = locator.into();
	Condition::new("to be able to switch to frame", move |driver| {
		let locator = locator.clone();
		async move {
			let Some(element) = driver.find_elements(locator).await?.into_iter().next() else {
				return Ok(false);
			};
			match driver.switch_to().frame(element).await {
				Ok(()) => Ok(true),
				Err(e) if e.is_kind(ErrorKind::NoSuchFrame) => Ok(false),
				Err(e) => Err(e),
			}
		}
	})
}

pub fn element_located(locator: impl Into<Locator>) -> ElementCondition {
	let locator = locator.into();
	ElementCondition::new(&format!("for element to be located {locator}"), move |driver| {
		let locator = locator.clone();
		async move {
			let first = driver.find_elements(locator).await?.into_iter().next();
			Ok(first.map_or(RemoteValue::Null, RemoteValue::Element))
		}
	})
}

pub fn elements_located(locator: impl Into<Locator>) -> Condition<Vec<WebElement>> {
	let locator = locator.into();
	Condition::new(&format!("for at least one element to be located {locator}"), move |driver| {
		let locator = locator.clone();
		async move { driver.find_elements(locator).await }
	})
}

/// True once `element` is no longer attached to the DOM.
pub fn staleness_of(element: &WebElement) -> Condition<bool> {
	let element = element.clone();
	Condition::new("element to become stale", move |_| {
		let element = element.clone();
		async move {
			match element.tag_name().await {
				Ok(_) => Ok(false),
				Err(e) if e.is_kind(ErrorKind::StaleElementReference) => Ok(true),
				Err(e) => Err(e),
			}
		}
	})
}

fn element_state<F, Fut>(message: &str, element: &WebElement, check: F) -> ElementCondition
where
	F: Fn(WebElement) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<bool>> + Send + 'static,
{
	let element = element.clone();
	ElementCondition::new(message, move |_| {
		let element = element.clone();
		let state = check(element.clone());
		async move {
			Ok(if state.await? {
				RemoteValue::Element(element)
			} else {
				RemoteValue::Null
			})
		}
	})
}

pub fn element_is_visible(element: &WebElement) -> ElementCondition {
	element_state("until element is visible", element, |e| async move { e.is_displayed().await })
}

pub fn element_is_not_visible(element: &WebElement) -> ElementCondition {
	element_state("until element is not visible", element, |e| async move {
		Ok(!e.is_displayed().await?)
	})
}

pub fn element_is_enabled(element: &WebElement) -> ElementCondition {
	element_state("until element is enabled", element, |e| async move { e.is_enabled().await })
}

pub fn element_is_disabled(element: &WebElement) -> ElementCondition {
	element_state("until element is disabled", element, |e| async move {
		Ok(!e.is_enabled().await?)
	})
}

pub fn element_is_selected(element: &WebElement) -> ElementCondition {
	element_state("until element is selected", element, |e| async move { e.is_selected().await })
}

pub fn element_is_not_selected(element: &WebElement) -> ElementCondition {
	element_state("until element is not selected", element, |e| async move {
		Ok(!e.is_selected().await?)
	})
}

pub fn element_text_is(element: &WebElement, text: &str) -> ElementCondition {
	let expected = text.to_string();
	element_state("until element text is", element, move |e| {
		let expected = expected.clone();
		async move { Ok(e.text().await? == expected) }
	})
}

pub fn element_text_contains(element: &WebElement, substr: &str) -> ElementCondition {
	let expected = substr.to_string();
	element_state("until element text contains", element, move |e| {
		let expected = expected.clone();
		async move { Ok(e.text().await?.contains(&expected)) }
	})
}

pub fn element_text_matches(element: &WebElement, regex: Regex) -> ElementCondition {
	element_state("until element text matches", element, move |e| {
		let regex = regex.clone();
		async move { Ok(regex.is_match(&e.text().await?)) }
	})
}
