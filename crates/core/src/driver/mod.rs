//! [`WebDriver`]: a remote session and the commands scoped to it.
//!
//! A driver owns exactly one session. The session may still be negotiating
//! when the driver is handed out ([`WebDriver::create_session`]); every command
//! waits for it first. Once [`quit`](WebDriver::quit) has run, the session is
//! replaced by a permanent [`ErrorKind::NoSuchSession`] failure.
//!
//! Commands are not serialized. Most remote ends expect one command in flight
//! per session, so callers that issue commands concurrently must order them
//! themselves.

mod authenticator;
mod navigation;
mod options;
mod print;
mod target_locator;

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use wd_protocol::{By, Capabilities};
use wd_runtime::{Command, CommandExecutor, CommandName, Error, ErrorKind, Result, Session};

pub use authenticator::{Credential, VirtualAuthenticatorOptions};
pub use navigation::Navigation;
pub use options::{Logs, Options, Window};
pub use print::{Margin, Orientation, PageSize, PrintOptions};
pub use target_locator::{Frame, TargetLocator};

use crate::codec::{Arg, Params, RemoteValue, decode};
use crate::element::WebElement;
use crate::file_upload::FileUpload;
use crate::handle::HandleId;
use crate::locator::{Locator, SearchContext, find_custom_element, find_custom_elements};

/// Callback run once when the session ends, or when it fails to start.
pub type OnQuit = Box<dyn FnOnce() + Send + 'static>;

type SessionFuture = Shared<BoxFuture<'static, Result<Session>>>;

const QUIT_MESSAGE: &str = "This driver instance does not have a valid session ID \
	(did you call WebDriver::quit()?) and may no longer be used.";

/// A script sent with an execute-script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
	/// A function body; `arguments` holds the script arguments.
	Body(String),
	/// Source of a JavaScript function, called with the script arguments.
	Function(String),
}

impl Script {
	pub fn function(source: impl Into<String>) -> Self {
		Script::Function(source.into())
	}

	/// The body sent on the wire.
	pub fn into_body(self) -> String {
		match self {
			Script::Body(body) => body,
			Script::Function(source) => format!("return ({source}).apply(null, arguments);"),
		}
	}
}

impl From<&str> for Script {
	fn from(body: &str) -> Self {
		Script::Body(body.to_string())
	}
}

impl From<String> for Script {
	fn from(body: String) -> Self {
		Script::Body(body)
	}
}

pub(crate) struct DriverInner {
	executor: Arc<dyn CommandExecutor>,
	session: RwLock<SessionFuture>,
	on_quit: Arc<Mutex<Option<OnQuit>>>,
	quit: AtomicBool,
	authenticator_id: Mutex<Option<String>>,
}

/// A WebDriver session.
///
/// Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct WebDriver {
	inner: Arc<DriverInner>,
}

impl fmt::Debug for WebDriver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let session = self.inner.session.read().peek().map(|s| s.as_ref().map(|s| s.id().to_string()).ok());
		f.debug_struct("WebDriver")
			.field("session", &session.flatten())
			.field("quit", &self.inner.quit.load(Ordering::SeqCst))
			.finish_non_exhaustive()
	}
}

impl WebDriver {
	/// Wraps an existing session.
	pub fn new(session: Session, executor: Arc<dyn CommandExecutor>) -> Self {
		Self::from_pending(future::ready(Ok(session)), executor, None)
	}

	/// Wraps a session that is still being negotiated.
	pub fn from_pending<F>(session: F, executor: Arc<dyn CommandExecutor>, on_quit: Option<OnQuit>) -> Self
	where
		F: Future<Output = Result<Session>> + Send + 'static,
	{
		Self::from_parts(executor, session.boxed().shared(), Arc::new(Mutex::new(on_quit)))
	}

	fn from_parts(executor: Arc<dyn CommandExecutor>, session: SessionFuture, on_quit: Arc<Mutex<Option<OnQuit>>>) -> Self {
		Self {
			inner: Arc::new(DriverInner {
				executor,
				session: RwLock::new(session),
				on_quit,
				quit: AtomicBool::new(false),
				authenticator_id: Mutex::new(None),
			}),
		}
	}

	pub(crate) fn downgrade(&self) -> Weak<DriverInner> {
		Arc::downgrade(&self.inner)
	}

	pub(crate) fn upgrade(inner: &Weak<DriverInner>) -> Option<Self> {
		inner.upgrade().map(|inner| Self { inner })
	}

	/// Starts a new session and returns at once.
	///
	/// Negotiation runs on a spawned task; commands wait for it. Only standard
	/// W3C capabilities and vendor-namespaced keys are sent. If negotiation
	/// fails, `on_quit` runs before the failure is reported.
	///
	/// Must be called within a Tokio runtime.
	pub fn create_session(executor: Arc<dyn CommandExecutor>, capabilities: Capabilities, on_quit: Option<OnQuit>) -> Self {
		let on_quit = Arc::new(Mutex::new(on_quit));
		let hook = Arc::clone(&on_quit);
		let session_executor = Arc::clone(&executor);

		let task = tokio::spawn(async move {
			let result = request_session(session_executor.as_ref(), capabilities).await;
			if let Err(err) = &result {
				warn!(target: "wd::driver", error = %err, "failed to create session");
				let hook = hook.lock().take();
				if let Some(hook) = hook {
					hook();
				}
			}
			result
		});

		let session = async move {
			match task.await {
				Ok(result) => result,
				Err(e) => Err(Error::unknown(format!("Session creation task failed: {e}"))),
			}
		};

		Self::from_parts(executor, session.boxed().shared(), on_quit)
	}

	/// Starts a new session and waits for it.
	pub async fn new_session(executor: Arc<dyn CommandExecutor>, capabilities: Capabilities, on_quit: Option<OnQuit>) -> Result<Self> {
		let driver = Self::create_session(executor, capabilities, on_quit);
		driver.session().await?;
		Ok(driver)
	}

	pub fn executor(&self) -> &Arc<dyn CommandExecutor> {
		&self.inner.executor
	}

	/// Returns true if both values drive the same session.
	pub fn ptr_eq(&self, other: &WebDriver) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	pub async fn session(&self) -> Result<Session> {
		let session = self.inner.session.read().clone();
		session.await
	}

	pub async fn capabilities(&self) -> Result<Capabilities> {
		Ok(self.session().await?.capabilities().clone())
	}

	/// Executes `command` in this session and decodes the result.
	pub async fn execute(&self, command: Command) -> Result<RemoteValue> {
		let (name, parameters) = command.into_parts();
		self.execute_with(name, Params::from(parameters)).await
	}

	/// Executes a command whose parameters may hold handles or pending values.
	pub async fn execute_with(&self, name: impl Into<CommandName>, params: Params) -> Result<RemoteValue> {
		let value = self.execute_raw(name.into(), params).await?;
		Ok(decode(self, value))
	}

	/// Executes a command registered on the executor with
	/// [`define_command`](wd_runtime::HttpExecutor::define_command).
	pub async fn execute_custom(&self, name: &str, params: Params) -> Result<RemoteValue> {
		self.execute_with(CommandName::from_name(name), params).await
	}

	pub(crate) async fn execute_raw(&self, name: CommandName, mut params: Params) -> Result<Value> {
		let session = self.session().await?;
		params.set("sessionId", session.id());
		let parameters = params.encode().await?;

		let command = Command::new(name).with_parameters(parameters);
		let response = self.inner.executor.execute(command).await?;
		Ok(response.into_value())
	}

	pub(crate) async fn execute_as<T: DeserializeOwned>(&self, name: CommandName, params: Params) -> Result<T> {
		let value = self.execute_raw(name, params).await?;
		Ok(serde_json::from_value(value)?)
	}

	pub(crate) async fn execute_unit(&self, name: CommandName, params: Params) -> Result<()> {
		self.execute_raw(name, params).await.map(drop)
	}

	/// Ends the session.
	///
	/// The session is unusable afterwards even if the remote end rejects the
	/// quit command, and the on-quit callback still runs. Calling `quit` again
	/// does nothing.
	pub async fn quit(&self) -> Result<()> {
		if self.inner.quit.swap(true, Ordering::SeqCst) {
			return Ok(());
		}

		let result = self.execute_raw(CommandName::Quit, Params::new()).await;

		let dead = future::ready(Err(Error::webdriver(ErrorKind::NoSuchSession, QUIT_MESSAGE)));
		*self.inner.session.write() = dead.boxed().shared();

		let hook = self.inner.on_quit.lock().take();
		if let Some(hook) = hook {
			hook();
		}

		match &result {
			Ok(_) => info!(target: "wd::driver", "session quit"),
			Err(err) => debug!(target: "wd::driver", error = %err, "quit command failed"),
		}
		result.map(drop)
	}

	/// Runs a synchronous script and decodes its result.
	pub async fn execute_script(&self, script: impl Into<Script>, args: Vec<Arg>) -> Result<RemoteValue> {
		let params = Params::new()
			.with("script", script.into().into_body())
			.with("args", args);
		self.execute_with(CommandName::ExecuteScript, params).await
	}

	/// Runs an asynchronous script; it signals completion through its last argument.
	pub async fn execute_async_script(&self, script: impl Into<Script>, args: Vec<Arg>) -> Result<RemoteValue> {
		let params = Params::new()
			.with("script", script.into().into_body())
			.with("args", args);
		self.execute_with(CommandName::ExecuteAsyncScript, params).await
	}

	pub async fn sleep(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}

	/// Navigates to `url`.
	pub async fn get(&self, url: &str) -> Result<()> {
		self.navigate().to(url).await
	}

	pub async fn current_url(&self) -> Result<String> {
		self.execute_as(CommandName::GetCurrentUrl, Params::new()).await
	}

	pub async fn title(&self) -> Result<String> {
		self.execute_as(CommandName::GetTitle, Params::new()).await
	}

	pub async fn page_source(&self) -> Result<String> {
		self.execute_as(CommandName::GetPageSource, Params::new()).await
	}

	/// Closes the current window. The session ends with its last window.
	pub async fn close(&self) -> Result<()> {
		self.execute_unit(CommandName::Close, Params::new()).await
	}

	pub async fn window_handle(&self) -> Result<String> {
		self.execute_as(CommandName::GetCurrentWindowHandle, Params::new()).await
	}

	pub async fn window_handles(&self) -> Result<Vec<String>> {
		self.execute_as(CommandName::GetWindowHandles, Params::new()).await
	}

	/// Finds the first element matching `locator`.
	pub async fn find_element(&self, locator: impl Into<Locator>) -> Result<WebElement> {
		match locator.into() {
			Locator::By(by) => {
				let value = self.execute_with(CommandName::FindElement, by_params(&by)).await?;
				expect_element(value)
			}
			Locator::Relative(relative) => {
				let found = self
					.execute_with(CommandName::FindElementsRelative, Params::new().with("args", relative.to_arg()))
					.await?;
				first_element(found).ok_or_else(|| {
					Error::webdriver(ErrorKind::NoSuchElement, "Cannot locate an element with provided parameters")
				})
			}
			Locator::Custom(custom) => find_custom_element(&custom, SearchContext::Driver(self.clone())).await,
		}
	}

	/// Returns an element handle at once; the lookup runs when the handle is
	/// first used, and a failed lookup fails every use of the handle.
	pub fn find_element_deferred(&self, locator: impl Into<Locator>) -> WebElement {
		let weak = self.downgrade();
		let locator = locator.into();
		let id = HandleId::pending(async move {
			let driver = WebDriver::upgrade(&weak)
				.ok_or_else(|| Error::webdriver(ErrorKind::NoSuchSession, "The driver for this element has been dropped"))?;
			driver.find_element(locator).await?.id().await
		});
		WebElement::from_handle(self, id)
	}

	/// Finds every element matching `locator`. No match is an empty list.
	pub async fn find_elements(&self, locator: impl Into<Locator>) -> Result<Vec<WebElement>> {
		let result = match locator.into() {
			Locator::By(by) => self.execute_with(CommandName::FindElements, by_params(&by)).await,
			Locator::Relative(relative) => {
				self.execute_with(CommandName::FindElementsRelative, Params::new().with("args", relative.to_arg()))
					.await
			}
			Locator::Custom(custom) => {
				return find_custom_elements(&custom, SearchContext::Driver(self.clone())).await;
			}
		};

		match result {
			Ok(value) => Ok(value.into_elements()),
			Err(e) if e.is_no_such_element() => Ok(Vec::new()),
			Err(e) => Err(e),
		}
	}

	/// Screenshot of the current viewport as base64-encoded PNG.
	pub async fn take_screenshot(&self) -> Result<String> {
		self.execute_as(CommandName::Screenshot, Params::new()).await
	}

	/// Prints the page to PDF, returned base64-encoded.
	pub async fn print_page(&self, options: &PrintOptions) -> Result<String> {
		let params = match serde_json::to_value(options)? {
			Value::Object(map) => Params::from(map),
			_ => Params::new(),
		};
		self.execute_as(CommandName::PrintPage, params).await
	}

	/// Uploads a local file to the remote end and returns its remote path.
	pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<String> {
		let upload = FileUpload::new(path.as_ref());
		upload.check().await?;
		self.execute_as(CommandName::UploadFile, Params::new().with("file", upload)).await
	}

	pub fn navigate(&self) -> Navigation<'_> {
		Navigation::new(self)
	}

	pub fn manage(&self) -> Options<'_> {
		Options::new(self)
	}

	pub fn switch_to(&self) -> TargetLocator<'_> {
		TargetLocator::new(self)
	}
}

pub(crate) fn by_params(by: &By) -> Params {
	Params::new().with("using", by.using.as_str()).with("value", by.value.as_str())
}

pub(crate) fn expect_element(value: RemoteValue) -> Result<WebElement> {
	let kind = value.type_name();
	value
		.into_element()
		.ok_or_else(|| Error::unknown(format!("Expected an element reference, got {kind}")))
}

fn first_element(value: RemoteValue) -> Option<WebElement> {
	match value {
		RemoteValue::Array(items) => items.into_iter().next().and_then(RemoteValue::into_element),
		other => other.into_element(),
	}
}

async fn request_session(executor: &dyn CommandExecutor, capabilities: Capabilities) -> Result<Session> {
	let payload = Arg::map([
		("firstMatch", Arg::from(vec![json!({})])),
		("alwaysMatch", Arg::from(capabilities.filter_w3c())),
	]);
	let parameters = Params::new().with("capabilities", payload).encode().await?;

	let command = Command::new(CommandName::NewSession).with_parameters(parameters);
	let session = executor.execute(command).await?.into_session()?;
	info!(target: "wd::driver", session = session.id(), "session created");
	Ok(session)
}
