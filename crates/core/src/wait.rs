//! Polling waits.
//!
//! A [`Condition`] is evaluated against the driver every poll interval until
//! it yields a truthy value or the timeout passes. Errors raised by the
//! condition end the wait at once; they are never retried.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::time::Instant;
use tracing::trace;
use wd_runtime::{Error, Result};

use crate::codec::RemoteValue;
use crate::driver::WebDriver;
use crate::element::WebElement;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Whether a condition result ends a wait.
pub trait Truthy {
	fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
	fn is_truthy(&self) -> bool {
		*self
	}
}

impl<T> Truthy for Option<T> {
	fn is_truthy(&self) -> bool {
		self.is_some()
	}
}

impl<T> Truthy for Vec<T> {
	fn is_truthy(&self) -> bool {
		!self.is_empty()
	}
}

impl Truthy for String {
	fn is_truthy(&self) -> bool {
		!self.is_empty()
	}
}

impl Truthy for RemoteValue {
	fn is_truthy(&self) -> bool {
		RemoteValue::is_truthy(self)
	}
}

impl Truthy for WebElement {
	fn is_truthy(&self) -> bool {
		true
	}
}

/// Wait deadline, poll spacing, and the message used on timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
	/// Zero waits without a deadline.
	pub timeout: Duration,
	/// Replaces the condition's description in timeout errors.
	pub message: Option<String>,
	pub poll_interval: Duration,
}

impl Default for WaitOptions {
	fn default() -> Self {
		Self {
			timeout: Duration::ZERO,
			message: None,
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}
}

impl WaitOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_timeout(timeout: Duration) -> Self {
		Self {
			timeout,
			..Self::default()
		}
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}
}

type CheckFn<T> = dyn Fn(WebDriver) -> BoxFuture<'static, Result<T>> + Send + Sync;

/// A described predicate evaluated against the driver.
pub struct Condition<T> {
	description: String,
	check: Arc<CheckFn<T>>,
}

impl<T> Clone for Condition<T> {
	fn clone(&self) -> Self {
		Self {
			description: self.description.clone(),
			check: Arc::clone(&self.check),
		}
	}
}

impl<T> fmt::Debug for Condition<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Condition").field("description", &self.description).finish_non_exhaustive()
	}
}

impl<T: Send + 'static> Condition<T> {
	/// `message` completes the sentence "Waiting ...".
	pub fn new<F, Fut>(message: &str, check: F) -> Self
	where
		F: Fn(WebDriver) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<T>> + Send + 'static,
	{
		Self {
			description: format!("Waiting {message}"),
			check: Arc::new(move |driver| check(driver).boxed()),
		}
	}

	/// A condition without a description.
	pub fn from_fn<F, Fut>(check: F) -> Self
	where
		F: Fn(WebDriver) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<T>> + Send + 'static,
	{
		Self {
			description: String::new(),
			check: Arc::new(move |driver| check(driver).boxed()),
		}
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub async fn evaluate(&self, driver: &WebDriver) -> Result<T> {
		(self.check)(driver.clone()).await
	}
}

/// A condition whose result must be an element.
#[derive(Clone, Debug)]
pub struct ElementCondition(Condition<RemoteValue>);

impl ElementCondition {
	pub fn new<F, Fut>(message: &str, check: F) -> Self
	where
		F: Fn(WebDriver) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<RemoteValue>> + Send + 'static,
	{
		Self(Condition::new(message, check))
	}

	pub fn description(&self) -> &str {
		self.0.description()
	}
}

impl From<ElementCondition> for Condition<RemoteValue> {
	fn from(condition: ElementCondition) -> Self {
		condition.0
	}
}

fn timeout_message(message: &str, detail: &str, elapsed: Duration) -> String {
	let elapsed = elapsed.as_millis();
	if message.is_empty() {
		format!("{detail} after {elapsed}ms")
	} else {
		format!("{message}\n{detail} after {elapsed}ms")
	}
}

/// Awaits `value`, failing with a timeout error if it takes longer than
/// `options.timeout`. A zero timeout waits indefinitely.
pub async fn wait_for<T, F>(value: F, options: WaitOptions) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	if options.timeout.is_zero() {
		return value.await;
	}

	let start = Instant::now();
	match tokio::time::timeout(options.timeout, value).await {
		Ok(result) => result,
		Err(_) => {
			let message = options.message.unwrap_or_default();
			Err(Error::timeout(timeout_message(
				&message,
				"Timed out waiting for value to resolve",
				start.elapsed(),
			)))
		}
	}
}

impl WebDriver {
	/// Polls `condition` until it yields a truthy value.
	///
	/// Fails with a timeout error once `options.timeout` has elapsed at a poll
	/// without success. Errors from the condition are returned as is.
	pub async fn wait<T>(&self, condition: impl Into<Condition<T>>, options: WaitOptions) -> Result<T>
	where
		T: Truthy + Send + 'static,
	{
		let condition = condition.into();
		let message = options
			.message
			.clone()
			.unwrap_or_else(|| condition.description().to_string());
		let start = Instant::now();

		loop {
			let value = condition.evaluate(self).await?;
			if value.is_truthy() {
				return Ok(value);
			}

			let elapsed = start.elapsed();
			if !options.timeout.is_zero() && elapsed >= options.timeout {
				return Err(Error::timeout(timeout_message(&message, "Wait timed out", elapsed)));
			}
			trace!(target: "wd::wait", elapsed_ms = elapsed.as_millis() as u64, "condition not met");
			tokio::time::sleep(options.poll_interval).await;
		}
	}

	/// Polls an element condition; the truthy result must be an element.
	pub async fn wait_for_element(&self, condition: ElementCondition, options: WaitOptions) -> Result<WebElement> {
		let value: RemoteValue = self.wait(Condition::from(condition), options).await?;
		let kind = value.type_name();
		value
			.into_element()
			.ok_or_else(|| Error::Contract(format!("ElementCondition did not resolve to a WebElement: {kind}")))
	}
}
