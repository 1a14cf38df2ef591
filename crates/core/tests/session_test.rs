// Session integration tests
//
// Drive a WebDriver over real HTTP against the fake remote end in
// `test_server`, in both wire dialects.

mod test_server;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use test_server::TestServer;
use wd::{
	Arg, By, Capabilities, ErrorKind, HttpClient, HttpExecutor, Method, Params, Script, Timeouts, VendorProfile,
	WaitOptions, WebDriver, until,
};

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

async fn connect(server: &TestServer) -> anyhow::Result<(WebDriver, Arc<HttpExecutor>)> {
	init_tracing();
	let executor = Arc::new(HttpExecutor::new(HttpClient::new(&server.url())?));
	let capabilities = Capabilities::for_browser("chrome").set("goog:chromeOptions", json!({"args": ["--headless"]}));
	let driver = WebDriver::new_session(executor.clone(), capabilities, None).await?;
	Ok((driver, executor))
}

#[tokio::test]
async fn test_w3c_session_round_trip() -> anyhow::Result<()> {
	let server = TestServer::start().await;
	let (driver, executor) = connect(&server).await?;

	assert!(executor.is_w3c());
	assert_eq!(driver.session().await?.id(), "w3c-1");

	let sent = server.last("/session").expect("new session request");
	assert_eq!(sent.body["capabilities"]["alwaysMatch"]["browserName"], "chrome");
	assert_eq!(sent.body["capabilities"]["firstMatch"], json!([{}]));

	driver.get("http://app.test/home").await?;
	assert_eq!(driver.current_url().await?, "http://app.test/home");
	assert_eq!(driver.title().await?, "Fake Page");

	let greeting = driver.find_element(By::css("#greeting")).await?;
	assert_eq!(greeting.text().await?, "text of greeting");
	greeting.click().await?;
	assert!(server.last("/element/greeting/click").is_some());

	assert_eq!(driver.find_elements(By::css("li")).await?.len(), 3);
	assert!(driver.find_elements(By::css(".absent")).await?.is_empty());

	let err = driver.find_element(By::css(".absent")).await.unwrap_err();
	assert!(err.is_no_such_element());
	assert_eq!(err.message(), "Unable to locate element");

	driver.quit().await?;
	assert_eq!(server.last("/session/w3c-1").expect("quit request").method, "DELETE");
	server.shutdown();
	Ok(())
}

#[tokio::test]
async fn test_legacy_session_round_trip() -> anyhow::Result<()> {
	let server = TestServer::start_legacy().await;
	let (driver, executor) = connect(&server).await?;

	assert!(!executor.is_w3c());
	assert_eq!(driver.session().await?.id(), "legacy-1");

	let items = driver.find_elements(By::css("li")).await?;
	assert_eq!(items[1].resolved_id(), Some("item-2"));

	let err = driver.find_element(By::css(".absent")).await.unwrap_err();
	assert!(err.is_no_such_element());

	driver.quit().await?;
	server.shutdown();
	Ok(())
}

#[tokio::test]
async fn test_script_arguments_round_trip_as_elements() -> anyhow::Result<()> {
	let server = TestServer::start().await;
	let (driver, _) = connect(&server).await?;

	let greeting = driver.find_element(By::css("#greeting")).await?;
	let result = driver
		.execute_script(Script::from("return arguments;"), vec![Arg::from(&greeting), Arg::from("plain")])
		.await?;

	let sent = server.last("/execute/sync").expect("script request");
	assert_eq!(sent.body["args"][0][test_server::ELEMENT_KEY], "greeting");

	let values = result.as_array().expect("array result");
	assert_eq!(values[0].as_element(), Some(&greeting));
	assert_eq!(values[1].as_str(), Some("plain"));
	server.shutdown();
	Ok(())
}

#[tokio::test]
async fn test_remote_errors_are_typed() -> anyhow::Result<()> {
	let server = TestServer::start().await;
	let (driver, executor) = connect(&server).await?;

	assert_eq!(driver.manage().get_cookie("session").await?, None);

	executor.define_command("bogus", Method::Get, "/session/:sessionId/bogus");
	let err = driver.execute_custom("bogus", Params::new()).await.unwrap_err();
	assert!(err.is_kind(ErrorKind::UnknownCommand));

	driver.manage().set_timeouts(Timeouts::new().implicit(250)).await?;
	assert_eq!(server.last("/timeouts").expect("timeouts request").body, json!({"implicit": 250}));
	server.shutdown();
	Ok(())
}

#[tokio::test]
async fn test_vendor_commands_use_profile_prefix() -> anyhow::Result<()> {
	let server = TestServer::start().await;
	let (driver, executor) = connect(&server).await?;
	VendorProfile::chrome().configure(&executor);

	let sinks = driver.chromium().cast_sinks().await?;
	assert_eq!(sinks, vec![json!({"name": "Living Room"})]);
	assert_eq!(server.last("/cast/get_sinks").expect("cast request").path, "/session/w3c-1/goog/cast/get_sinks");
	server.shutdown();
	Ok(())
}

#[tokio::test]
async fn test_wait_over_http() -> anyhow::Result<()> {
	let server = TestServer::start().await;
	let (driver, _) = connect(&server).await?;
	let options = WaitOptions::with_timeout(Duration::from_secs(2)).poll_interval(Duration::from_millis(20));

	assert!(driver.wait(until::title_is("Fake Page"), options.clone()).await?);
	let element = driver.wait_for_element(until::element_located(By::css("#greeting")), options).await?;
	assert_eq!(element.resolved_id(), Some("greeting"));

	let short = WaitOptions::with_timeout(Duration::from_millis(100)).poll_interval(Duration::from_millis(20));
	let err = driver.wait(until::url_contains("/never"), short).await.unwrap_err();
	assert!(err.is_timeout());
	assert!(err.message().starts_with("Waiting for URL to contain \"/never\"\n"));
	server.shutdown();
	Ok(())
}
