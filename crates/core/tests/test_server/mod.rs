// Fake WebDriver remote end for integration tests.
//
// Answers a small fixed page in either the W3C or the legacy JSON wire
// dialect and records every request it receives.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Clone)]
pub struct Recorded {
	pub method: String,
	pub path: String,
	pub body: Value,
}

#[derive(Default)]
struct ServerState {
	legacy: bool,
	url: Mutex<String>,
	requests: Mutex<Vec<Recorded>>,
}

pub struct TestServer {
	addr: SocketAddr,
	state: Arc<ServerState>,
	handle: JoinHandle<()>,
}

impl TestServer {
	/// Starts a W3C remote end on an ephemeral port.
	pub async fn start() -> Self {
		Self::spawn(false).await
	}

	/// Starts a remote end speaking the legacy JSON wire dialect.
	pub async fn start_legacy() -> Self {
		Self::spawn(true).await
	}

	async fn spawn(legacy: bool) -> Self {
		let state = Arc::new(ServerState {
			legacy,
			url: Mutex::new("about:blank".to_string()),
			..Default::default()
		});
		let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
			.await
			.expect("Failed to bind test server");
		let addr = listener.local_addr().expect("Failed to read test server address");
		let handle = tokio::spawn(async move {
			axum::serve(listener, app).await.expect("Test server failed");
		});

		Self { addr, state, handle }
	}

	pub fn url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.state.requests.lock().clone()
	}

	/// Most recent request whose path ends with `suffix`.
	pub fn last(&self, suffix: &str) -> Option<Recorded> {
		self.state.requests.lock().iter().rev().find(|r| r.path.ends_with(suffix)).cloned()
	}

	pub fn shutdown(self) {
		self.handle.abort();
	}
}

async fn handle(State(state): State<Arc<ServerState>>, method: Method, uri: Uri, body: String) -> Response {
	let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
	let path = uri.path().to_string();
	state.requests.lock().push(Recorded {
		method: method.to_string(),
		path: path.clone(),
		body: body.clone(),
	});

	let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
	let result = match (method.as_str(), segments.as_slice()) {
		("POST", ["session"]) => return new_session(&state, &body),
		("DELETE", ["session", _]) => Ok(Value::Null),
		("POST", ["session", _, "url"]) => {
			*state.url.lock() = body["url"].as_str().unwrap_or_default().to_string();
			Ok(Value::Null)
		}
		("GET", ["session", _, "url"]) => Ok(json!(*state.url.lock())),
		("GET", ["session", _, "title"]) => Ok(json!("Fake Page")),
		("POST", ["session", _, "element"]) => find(&state, &body).and_then(|found| {
			found
				.into_iter()
				.next()
				.ok_or_else(|| ("no such element", 7, "Unable to locate element".to_string()))
		}),
		("POST", ["session", _, "elements"]) => find(&state, &body).map(Value::from),
		("GET", ["session", _, "element", id, "text"]) => Ok(json!(format!("text of {id}"))),
		("POST", ["session", _, "element", _, "click"]) => Ok(Value::Null),
		("POST", ["session", _, "execute", "sync"]) => Ok(body["args"].clone()),
		("POST", ["session", _, "timeouts"]) => Ok(Value::Null),
		("GET", ["session", _, "cookie", name]) => Err(("no such cookie", 62, format!("No cookie named {name}"))),
		("GET", ["session", _, "goog", "cast", "get_sinks"]) => Ok(json!([{"name": "Living Room"}])),
		_ => return (StatusCode::NOT_FOUND, format!("Unknown command: {method} {path}")).into_response(),
	};

	match result {
		Ok(value) => reply(&state, value),
		Err((error, status, message)) => fail(&state, error, status, &message),
	}
}

type Outcome<T> = Result<T, (&'static str, i64, String)>;

fn find(state: &ServerState, body: &Value) -> Outcome<Vec<Value>> {
	let selector = body["value"].as_str().unwrap_or_default();
	let ids: &[&str] = match selector {
		"#greeting" => &["greeting"],
		"li" => &["item-1", "item-2", "item-3"],
		"" => return Err(("invalid argument", 61, "missing selector".to_string())),
		_ => &[],
	};
	Ok(ids.iter().map(|id| reference(state, id)).collect())
}

fn reference(state: &ServerState, id: &str) -> Value {
	if state.legacy {
		json!({"ELEMENT": id})
	} else {
		json!({ELEMENT_KEY: id})
	}
}

fn new_session(state: &ServerState, body: &Value) -> Response {
	let requested = body
		.pointer("/capabilities/alwaysMatch")
		.or_else(|| body.get("desiredCapabilities"))
		.cloned()
		.unwrap_or_else(|| json!({}));
	if state.legacy {
		axum::Json(json!({"status": 0, "sessionId": "legacy-1", "value": requested})).into_response()
	} else {
		axum::Json(json!({"value": {"sessionId": "w3c-1", "capabilities": requested}})).into_response()
	}
}

fn reply(state: &ServerState, value: Value) -> Response {
	if state.legacy {
		axum::Json(json!({"status": 0, "value": value})).into_response()
	} else {
		axum::Json(json!({ "value": value })).into_response()
	}
}

fn fail(state: &ServerState, error: &str, status: i64, message: &str) -> Response {
	if state.legacy {
		let body = json!({"status": status, "value": {"message": message}});
		(StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
	} else {
		let body = json!({"value": {"error": error, "message": message, "stacktrace": ""}});
		(StatusCode::NOT_FOUND, axum::Json(body)).into_response()
	}
}
