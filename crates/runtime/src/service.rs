//! Driver service management
//!
//! A [`DriverService`] launches a local WebDriver server executable
//! (chromedriver, msedgedriver, geckodriver, ...) on a known port and resolves
//! to the server's base URL once it answers `GET /status`.
//!
//! The child process is owned by a supervisor task. If the process exits
//! before the server becomes reachable, the pending start fails immediately
//! instead of waiting out its deadline.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::process::{Child, Command as ProcessCommand};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandName};
use crate::error::{Error, ErrorKind, Result};
use crate::executor::{CommandExecutor, HttpExecutor};
use crate::http::{HttpClient, Method, Request};

/// Default time allowed for a service to become reachable.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between readiness probes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Base URL of a started service, shared by every caller of [`DriverService::start`].
pub type ServiceAddress = Shared<BoxFuture<'static, Result<String>>>;

/// Launch configuration for a [`DriverService`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceOptions {
	/// Extra command-line arguments. `--port=<port>` is appended automatically.
	pub args: Vec<String>,
	/// Port to listen on; 0 picks a free port.
	pub port: u16,
	/// Host the server is reached at.
	pub hostname: Option<String>,
	/// Reach the server over the loopback address when no hostname is set.
	pub loopback: bool,
	/// Base path of the server's endpoints.
	pub path: Option<String>,
	/// Extra environment variables.
	pub env: Vec<(String, String)>,
	/// Forward the server's stdout and stderr to this process.
	pub inherit_stdio: bool,
}

/// Builds a [`DriverService`].
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
	executable: PathBuf,
	options: ServiceOptions,
}

impl ServiceBuilder {
	pub fn new(executable: impl Into<PathBuf>) -> Self {
		Self {
			executable: executable.into(),
			options: ServiceOptions::default(),
		}
	}

	pub fn with_options(mut self, options: ServiceOptions) -> Self {
		self.options = options;
		self
	}

	pub fn add_arguments<I, S>(mut self, args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.options.args.extend(args.into_iter().map(Into::into));
		self
	}

	pub fn port(mut self, port: u16) -> Self {
		self.options.port = port;
		self
	}

	pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
		self.options.hostname = Some(hostname.into());
		self
	}

	pub fn loopback(mut self, loopback: bool) -> Self {
		self.options.loopback = loopback;
		self
	}

	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.options.path = Some(path.into());
		self
	}

	pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.options.env.push((key.into(), value.into()));
		self
	}

	pub fn inherit_stdio(mut self, inherit: bool) -> Self {
		self.options.inherit_stdio = inherit;
		self
	}

	/// Validates the executable and resolves the port.
	///
	/// # Errors
	///
	/// Returns [`Error::Service`] if the executable does not exist, and
	/// [`Error::Io`] if no free port can be found.
	pub fn build(self) -> Result<DriverService> {
		if !self.executable.exists() {
			return Err(Error::Service(format!(
				"The specified executable path does not exist: {}",
				self.executable.display()
			)));
		}

		let mut options = self.options;
		if options.port == 0 {
			options.port = find_free_port()?;
		}
		options.args.push(format!("--port={}", options.port));

		Ok(DriverService {
			executable: self.executable,
			options,
			state: Arc::new(Mutex::new(State::default())),
		})
	}
}

#[derive(Default)]
struct State {
	generation: u64,
	running: Option<Running>,
}

struct Running {
	generation: u64,
	address: ServiceAddress,
	kill: oneshot::Sender<()>,
}

/// A local WebDriver server process.
///
/// Dropping the service terminates the process.
pub struct DriverService {
	executable: PathBuf,
	options: ServiceOptions,
	state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for DriverService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DriverService")
			.field("executable", &self.executable)
			.field("options", &self.options)
			.field("running", &self.is_running())
			.finish()
	}
}

impl DriverService {
	pub fn builder(executable: impl Into<PathBuf>) -> ServiceBuilder {
		ServiceBuilder::new(executable)
	}

	pub fn port(&self) -> u16 {
		self.options.port
	}

	/// URL the server is expected to answer on.
	pub fn url(&self) -> String {
		let hostname = match &self.options.hostname {
			Some(hostname) => hostname.clone(),
			None if self.options.loopback => "127.0.0.1".to_string(),
			None => "localhost".to_string(),
		};
		let path = self.options.path.as_deref().unwrap_or("/");
		let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
		format!("http://{}:{}{}", hostname, self.options.port, path)
	}

	/// Whether the service has been started and not killed since.
	pub fn is_running(&self) -> bool {
		self.state.lock().running.is_some()
	}

	/// Returns the address of a started service.
	pub fn address(&self) -> Result<ServiceAddress> {
		self.state
			.lock()
			.running
			.as_ref()
			.map(|running| running.address.clone())
			.ok_or_else(|| Error::Service("Server has not been started.".to_string()))
	}

	/// Starts the server, or returns the pending address of the running one.
	///
	/// The returned future resolves to the base URL once `GET /status`
	/// answers, and fails if the process exits first or `timeout` elapses.
	/// Must be called within a Tokio runtime.
	pub fn start(&self, timeout: Duration) -> ServiceAddress {
		let mut state = self.state.lock();
		if let Some(running) = &state.running {
			return running.address.clone();
		}

		let mut command = ProcessCommand::new(&self.executable);
		command
			.args(&self.options.args)
			.envs(self.options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
			.stdin(Stdio::null())
			.kill_on_drop(true);
		if self.options.inherit_stdio {
			command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
		} else {
			command.stdout(Stdio::null()).stderr(Stdio::null());
		}

		let child = match command.spawn() {
			Ok(child) => child,
			Err(e) => {
				let err = Error::Service(format!("Failed to spawn {}: {}", self.executable.display(), e));
				return future::ready(Err(err)).boxed().shared();
			}
		};
		debug!(target: "wd::service", executable = %self.executable.display(), pid = child.id(), "spawned driver service");

		state.generation += 1;
		let generation = state.generation;
		let (kill_tx, kill_rx) = oneshot::channel();
		let (exit_tx, exit_rx) = oneshot::channel();
		tokio::spawn(supervise(child, kill_rx, exit_tx, Arc::clone(&self.state), generation));

		let url = self.url();
		let address = async move {
			let cancel = async move {
				match exit_rx.await {
					Ok(reason) => reason,
					Err(_) => future::pending().await,
				}
			};
			wait_for_server(&url, timeout, cancel).await?;
			info!(target: "wd::service", %url, "driver service ready");
			Ok(url)
		}
		.boxed()
		.shared();

		state.running = Some(Running {
			generation,
			address: address.clone(),
			kill: kill_tx,
		});
		address
	}

	/// Stops the server. A later [`start`](Self::start) launches a new process.
	pub fn kill(&self) {
		if let Some(running) = self.state.lock().running.take() {
			debug!(target: "wd::service", "killing driver service");
			let _ = running.kill.send(());
		}
	}
}

impl Drop for DriverService {
	fn drop(&mut self) {
		self.kill();
	}
}

/// Owns the child process until it exits or is killed.
async fn supervise(
	mut child: Child,
	kill: oneshot::Receiver<()>,
	exited: oneshot::Sender<String>,
	state: Arc<Mutex<State>>,
	generation: u64,
) {
	tokio::select! {
		status = child.wait() => {
			let reason = match status {
				Ok(status) => match status.code() {
					Some(code) => format!("Server terminated early with status {code}"),
					None => "Server was killed by a signal".to_string(),
				},
				Err(e) => format!("Failed to wait for server process: {e}"),
			};
			warn!(target: "wd::service", %reason, "driver service exited");
			let _ = exited.send(reason);

			let mut state = state.lock();
			if state.running.as_ref().is_some_and(|running| running.generation == generation) {
				state.running = None;
			}
		}
		_ = kill => {
			if let Err(e) = child.kill().await {
				warn!(target: "wd::service", error = %e, "failed to kill driver service");
			}
		}
	}
}

/// Binds an ephemeral loopback port and releases it.
pub fn find_free_port() -> Result<u16> {
	let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
	Ok(listener.local_addr()?.port())
}

/// Queries `GET /status` on the server at `url`.
pub async fn get_status(url: &str) -> Result<Value> {
	let executor = HttpExecutor::new(HttpClient::new(url)?);
	let response = executor.execute(Command::new(CommandName::GetStatus)).await?;
	Ok(response.into_value())
}

/// Polls `GET /status` every [`POLL_INTERVAL`] until the server answers.
///
/// A server that rejects the status command as unknown or unsupported counts
/// as ready. `cancel` aborts the wait with its output as the error message.
pub async fn wait_for_server<C>(url: &str, timeout: Duration, cancel: C) -> Result<Value>
where
	C: Future<Output = String>,
{
	let start = Instant::now();
	tokio::pin!(cancel);

	let timed_out = || Error::Service(format!("Timed out waiting for the WebDriver server at {url}"));

	loop {
		let remaining = timeout.saturating_sub(start.elapsed());
		tokio::select! {
			reason = &mut cancel => return Err(Error::Service(reason)),
			status = tokio::time::timeout(remaining, get_status(url)) => match status {
				Err(_) => return Err(timed_out()),
				Ok(Ok(status)) => return Ok(status),
				Ok(Err(e)) if e.is_kind(ErrorKind::UnsupportedOperation) || e.is_kind(ErrorKind::UnknownCommand) => {
					return Ok(json!({}));
				}
				Ok(Err(e)) => debug!(target: "wd::service", error = %e, "server not ready"),
			},
		}

		if start.elapsed() >= timeout {
			return Err(timed_out());
		}

		tokio::select! {
			reason = &mut cancel => return Err(Error::Service(reason)),
			_ = tokio::time::sleep(POLL_INTERVAL) => {}
		}
	}
}

/// Polls `GET url` every [`POLL_INTERVAL`] until it returns a 2xx status.
pub async fn wait_for_url<C>(url: &str, timeout: Duration, cancel: C) -> Result<()>
where
	C: Future<Output = String>,
{
	let client = HttpClient::new(url)?;
	let request = Request::new(Method::Get, "", Value::Null);
	let start = Instant::now();
	tokio::pin!(cancel);

	let timed_out = || Error::Service(format!("Timed out waiting for the URL to return 2xx: {url}"));

	loop {
		let remaining = timeout.saturating_sub(start.elapsed());
		tokio::select! {
			reason = &mut cancel => return Err(Error::Service(reason)),
			response = tokio::time::timeout(remaining, client.send(&request)) => match response {
				Err(_) => return Err(timed_out()),
				Ok(Ok(response)) if (200..300).contains(&response.status) => return Ok(()),
				Ok(_) => {}
			},
		}

		if start.elapsed() >= timeout {
			return Err(timed_out());
		}

		tokio::select! {
			reason = &mut cancel => return Err(Error::Service(reason)),
			_ = tokio::time::sleep(POLL_INTERVAL) => {}
		}
	}
}
