use std::collections::VecDeque;
use std::sync::Arc;

use axum::Router;
use axum::extract::Request as AxumRequest;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use parking_lot::Mutex;
use serde_json::json;

use super::*;

type Scripted = std::result::Result<WireResponse, NetworkError>;

/// Connector that replays canned outcomes and records every request.
#[derive(Default)]
struct ScriptedConnector {
	outcomes: Mutex<VecDeque<Scripted>>,
	requests: Mutex<Vec<WireRequest>>,
}

impl ScriptedConnector {
	fn new(outcomes: Vec<Scripted>) -> Arc<Self> {
		Arc::new(Self {
			outcomes: Mutex::new(outcomes.into()),
			requests: Mutex::new(Vec::new()),
		})
	}

	fn requests(&self) -> Vec<WireRequest> {
		self.requests.lock().clone()
	}
}

impl Connector for ScriptedConnector {
	fn exchange(&self, request: WireRequest) -> ExchangeFuture<'_> {
		self.requests.lock().push(request);
		let outcome = self
			.outcomes
			.lock()
			.pop_front()
			.unwrap_or_else(|| Err(NetworkError::other("no scripted response")));
		Box::pin(async move { outcome })
	}
}

fn ok(status: u16, body: &str) -> Scripted {
	Ok(WireResponse {
		status,
		headers: vec![("content-type".into(), "application/json".into())],
		body: body.to_string(),
	})
}

fn redirect(status: u16, location: &str) -> Scripted {
	Ok(WireResponse {
		status,
		headers: vec![("location".into(), location.to_string())],
		body: String::new(),
	})
}

fn client(base: &str, connector: Arc<ScriptedConnector>) -> HttpClient {
	HttpClient::with_connector(base, "test-agent/1.0", connector).unwrap()
}

#[test]
fn test_join_path() {
	assert_eq!(join_path("/", "/session"), "/session");
	assert_eq!(join_path("/wd/hub", "/session"), "/wd/hub/session");
	assert_eq!(join_path("/wd/hub/", "/session"), "/wd/hub/session");
	assert_eq!(join_path("/wd/hub/", "session"), "/wd/hub/session");
}

#[test]
fn test_default_user_agent() {
	let agent = default_user_agent();
	assert!(agent.starts_with(&format!("wd-rs/{} (rust ", env!("CARGO_PKG_VERSION"))));
	assert!(agent.ends_with(')'));
}

#[test]
fn test_options_deserialize() {
	let options: HttpClientOptions = serde_json::from_value(json!({
		"userAgent": "custom",
		"keepAlive": true,
		"proxy": "http://proxy:3128",
	}))
	.unwrap();
	assert_eq!(options.user_agent.as_deref(), Some("custom"));
	assert!(options.keep_alive);
	assert_eq!(options.proxy.as_deref(), Some("http://proxy:3128"));
	assert_eq!(options.request_timeout_ms, None);
}

#[test]
fn test_network_error_display() {
	let err = NetworkError::new("ECONNRESET", "socket hang up");
	assert_eq!(err.to_string(), "ECONNRESET socket hang up");
	assert!(err.is_transient());
	assert!(!NetworkError::new("ENOTFOUND", "dns").is_transient());
	assert!(!NetworkError::other("weird").is_transient());
}

#[tokio::test]
async fn test_post_sends_json_body_and_headers() {
	let connector = ScriptedConnector::new(vec![ok(200, r#"{"value":null}"#)]);
	let client = client("http://localhost:4444/wd/hub", connector.clone());

	let request = Request::new(Method::Post, "/session/abc/url", json!({"url": "https://example.com"}));
	let response = client.send(&request).await.unwrap();
	assert_eq!(response.status, 200);

	let sent = connector.requests();
	assert_eq!(sent.len(), 1);
	let wire = &sent[0];
	assert_eq!(wire.method, Method::Post);
	assert_eq!(wire.url.as_str(), "http://localhost:4444/wd/hub/session/abc/url");
	assert_eq!(wire.header("accept"), Some(ACCEPT_JSON));
	assert_eq!(wire.header("content-type"), Some(CONTENT_TYPE_JSON));
	assert_eq!(wire.header("user-agent"), Some("test-agent/1.0"));
	assert_eq!(wire.body.as_deref(), Some(r#"{"url":"https://example.com"}"#));
}

#[tokio::test]
async fn test_get_and_delete_have_no_body() {
	let connector = ScriptedConnector::new(vec![ok(200, "{}"), ok(200, "{}")]);
	let client = client("http://localhost:4444/", connector.clone());

	client.send(&Request::new(Method::Get, "/status", json!({}))).await.unwrap();
	client
		.send(&Request::new(Method::Delete, "/session/abc", json!({})))
		.await
		.unwrap();

	for wire in connector.requests() {
		assert_eq!(wire.body, None);
		assert_eq!(wire.header("content-type"), None);
	}
	assert_eq!(connector.requests()[0].url.as_str(), "http://localhost:4444/status");
}

#[tokio::test]
async fn test_strips_nul_characters() {
	let connector = ScriptedConnector::new(vec![ok(200, "{\"value\":\0\"x\"}\0")]);
	let client = client("http://localhost:4444", connector);

	let response = client.send(&Request::new(Method::Get, "/status", json!({}))).await.unwrap();
	assert_eq!(response.body, r#"{"value":"x"}"#);
}

#[tokio::test(start_paused = true)]
async fn test_retries_transient_failures() {
	let connector = ScriptedConnector::new(vec![
		Err(NetworkError::new("ECONNRESET", "socket hang up")),
		Err(NetworkError::new("ECONNREFUSED", "refused")),
		ok(200, "{}"),
	]);
	let client = client("http://localhost:4444", connector.clone());

	let response = client.send(&Request::new(Method::Get, "/status", json!({}))).await.unwrap();
	assert_eq!(response.status, 200);
	assert_eq!(connector.requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_retries() {
	let failures = (0..5)
		.map(|_| Err(NetworkError::new("ECONNRESET", "socket hang up")))
		.collect();
	let connector = ScriptedConnector::new(failures);
	let client = client("http://localhost:4444", connector.clone());

	let err = client
		.send(&Request::new(Method::Get, "/status", json!({})))
		.await
		.unwrap_err();
	assert_eq!(err.to_string(), "ECONNRESET socket hang up");
	assert_eq!(connector.requests().len(), 1 + MAX_RETRIES as usize);
}

#[tokio::test(start_paused = true)]
async fn test_non_transient_failure_is_not_retried() {
	let connector = ScriptedConnector::new(vec![Err(NetworkError::new("ENOTFOUND", "getaddrinfo failed")), ok(200, "{}")]);
	let client = client("http://localhost:4444", connector.clone());

	let err = client
		.send(&Request::new(Method::Get, "/status", json!({})))
		.await
		.unwrap_err();
	assert!(matches!(err, Error::Network(_)));
	assert_eq!(err.to_string(), "ENOTFOUND getaddrinfo failed");
	assert_eq!(connector.requests().len(), 1);
}

#[tokio::test]
async fn test_relative_redirect_keeps_host() {
	let connector = ScriptedConnector::new(vec![redirect(302, "/other"), ok(200, "{}")]);
	let client = client("http://user:pw@localhost:4444/wd/hub", connector.clone());

	let request = Request::new(Method::Post, "/session", json!({"capabilities": {}}));
	client.send(&request).await.unwrap();

	let sent = connector.requests();
	assert_eq!(sent.len(), 2);
	let follow = &sent[1];
	assert_eq!(follow.method, Method::Get);
	assert_eq!(follow.url.as_str(), "http://user:pw@localhost:4444/other");
	assert_eq!(follow.body, None);
	assert_eq!(
		follow.headers,
		vec![
			("Accept".to_string(), ACCEPT_JSON.to_string()),
			("User-Agent".to_string(), "test-agent/1.0".to_string()),
		]
	);
}

#[tokio::test]
async fn test_absolute_redirect_switches_host() {
	let connector = ScriptedConnector::new(vec![redirect(303, "http://grid:5555/session/1"), ok(200, "{}")]);
	let client = client("http://user:pw@localhost:4444", connector.clone());

	client.send(&Request::new(Method::Get, "/session/1", json!({}))).await.unwrap();

	let follow = &connector.requests()[1];
	assert_eq!(follow.url.as_str(), "http://grid:5555/session/1");
}

#[tokio::test]
async fn test_redirect_without_location_fails_at_once() {
	let connector = ScriptedConnector::new(vec![
		Ok(WireResponse {
			status: 302,
			headers: vec![],
			body: String::new(),
		}),
		ok(200, "{}"),
	]);
	let client = client("http://localhost:4444", connector.clone());

	let err = client
		.send(&Request::new(Method::Get, "/status", json!({})))
		.await
		.unwrap_err();
	assert!(err.to_string().contains("Missing \"Location\" header"));
	assert_eq!(connector.requests().len(), 1);
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
	let outcomes = (0..=MAX_REDIRECTS + 1).map(|_| redirect(302, "/loop")).collect();
	let connector = ScriptedConnector::new(outcomes);
	let client = client("http://localhost:4444", connector.clone());

	let err = client.send(&Request::new(Method::Get, "/loop", json!({}))).await.unwrap_err();
	assert!(err.to_string().contains("Too many redirects"));
	assert_eq!(connector.requests().len(), MAX_REDIRECTS as usize + 1);
}

#[test]
fn test_invalid_server_url() {
	let err = HttpClient::with_connector("not a url", "ua", ScriptedConnector::new(vec![])).unwrap_err();
	assert!(matches!(err, Error::InvalidUrl(_)));
}

async fn serve(app: Router) -> std::net::SocketAddr {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, app).await.unwrap();
	});
	addr
}

#[tokio::test]
async fn test_reqwest_connector_follows_redirect() {
	let app = Router::new()
		.route(
			"/wd/hub/status",
			get(|| async { axum::Json(json!({"value": {"ready": true, "message": "ok"}})) }),
		)
		.route(
			"/wd/hub/old",
			get(|| async { (StatusCode::FOUND, [("location", "/wd/hub/status")]).into_response() }),
		);
	let addr = serve(app).await;

	let client = HttpClient::new(&format!("http://{addr}/wd/hub")).unwrap();
	let response = client.send(&Request::new(Method::Get, "/old", json!({}))).await.unwrap();

	assert_eq!(response.status, 200);
	let body: Value = serde_json::from_str(&response.body).unwrap();
	assert_eq!(body["value"]["ready"], true);
}

#[tokio::test]
async fn test_reqwest_connector_reports_connection_refused() {
	let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();
	drop(listener);

	let client = HttpClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
	let err = client
		.send(&Request::new(Method::Get, "/status", json!({})))
		.await
		.unwrap_err();

	match err {
		Error::Network(network) => assert_eq!(network.code.as_deref(), Some("ECONNREFUSED")),
		other => panic!("expected network error, got {other:?}"),
	}
}

/// Forwards to a real connector, counting exchanges.
struct CountingConnector {
	inner: ReqwestConnector,
	calls: Mutex<usize>,
}

impl Connector for CountingConnector {
	fn exchange(&self, request: WireRequest) -> ExchangeFuture<'_> {
		*self.calls.lock() += 1;
		self.inner.exchange(request)
	}
}

#[tokio::test]
async fn test_unresolvable_host_is_not_retried() {
	let connector = Arc::new(CountingConnector {
		inner: ReqwestConnector::new(true, None, Some(std::time::Duration::from_secs(10))).unwrap(),
		calls: Mutex::new(0),
	});
	let client = HttpClient::with_connector("http://nonexistent.invalid", "test-agent/1.0", connector.clone()).unwrap();

	let err = client
		.send(&Request::new(Method::Get, "/status", json!({})))
		.await
		.unwrap_err();

	match err {
		Error::Network(network) => assert!(!network.is_transient(), "retryable code {:?}", network.code),
		other => panic!("expected network error, got {other:?}"),
	}
	assert_eq!(*connector.calls.lock(), 1);
}

#[tokio::test]
async fn test_reqwest_connector_uses_proxy() {
	let seen = Arc::new(Mutex::new(Vec::<(String, Option<String>)>::new()));
	let recorder = seen.clone();
	let app = Router::new().fallback(move |request: AxumRequest| {
		let recorder = recorder.clone();
		async move {
			let auth = request
				.headers()
				.get("proxy-authorization")
				.and_then(|v| v.to_str().ok())
				.map(str::to_string);
			recorder.lock().push((request.uri().to_string(), auth));
			axum::Json(json!({"value": null}))
		}
	});
	let proxy = serve(app).await;

	let options = HttpClientOptions::new().proxy(format!("http://user:pass@{proxy}"));
	let client = HttpClient::with_options("http://remote.test:4444/wd/hub", options).unwrap();
	client.send(&Request::new(Method::Get, "/status", json!({}))).await.unwrap();

	let seen = seen.lock().clone();
	assert_eq!(seen.len(), 1);
	assert_eq!(seen[0].0, "http://remote.test:4444/wd/hub/status");
	assert_eq!(seen[0].1.as_deref(), Some("Basic dXNlcjpwYXNz"));
}
