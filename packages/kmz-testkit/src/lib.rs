//! An in-process stand-in for the marketplace's search and listing endpoints.

mod error;

pub use error::{Error, Result};

use std::{
	collections::{BTreeMap, HashMap},
	net::SocketAddr,
	sync::{Arc, Mutex, MutexGuard},
};

use axum::{
	Json, Router,
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	routing::{get, post},
};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::oneshot};

use kmz_config::{Config, EndpointConfig, Remote, Search, Service};

pub const SEARCH_PATH: &str = "/kimitzu/search";
pub const LISTING_PATH: &str = "/ob/listing/";

/// A search request as the mock received it.
#[derive(Clone, Debug)]
pub struct RecordedSearch {
	pub body: Value,
	pub headers: BTreeMap<String, String>,
}

#[derive(Default)]
struct MockState {
	search_reply: Mutex<Option<(StatusCode, Value)>>,
	listings: Mutex<HashMap<String, (StatusCode, Value)>>,
	searches: Mutex<Vec<RecordedSearch>>,
	listing_requests: Mutex<Vec<String>>,
}

pub struct MockMarket {
	addr: SocketAddr,
	state: Arc<MockState>,
	shutdown: Option<oneshot::Sender<()>>,
}
impl MockMarket {
	pub async fn start() -> Result<Self> {
		let state = Arc::new(MockState::default());
		let app = Router::new()
			.route(SEARCH_PATH, post(search))
			.route(&format!("{LISTING_PATH}{{hash}}"), get(listing))
			.with_state(state.clone());
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (shutdown, signal) = oneshot::channel::<()>();

		tokio::spawn(async move {
			let server = axum::serve(listener, app).with_graceful_shutdown(async move {
				let _ = signal.await;
			});

			if let Err(err) = server.await {
				eprintln!("Mock market server failed: {err}.");
			}
		});

		Ok(Self { addr, state, shutdown: Some(shutdown) })
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn search_endpoint(&self) -> EndpointConfig {
		self.endpoint(SEARCH_PATH)
	}

	pub fn listing_endpoint(&self) -> EndpointConfig {
		self.endpoint(LISTING_PATH)
	}

	/// A complete config pointing both endpoints at this mock.
	pub fn config(&self) -> Config {
		Config {
			service: Service::default(),
			remote: Remote { search: self.search_endpoint(), listing: self.listing_endpoint() },
			search: Search::default(),
		}
	}

	pub fn set_search_reply(&self, status: u16, body: Value) {
		*lock(&self.state.search_reply) = Some((to_status(status), body));
	}

	/// Replies with `count` and one `{ "hash": .. }` entry per hash.
	pub fn set_search_hashes(&self, count: u64, hashes: &[&str]) {
		let data: Vec<Value> =
			hashes.iter().map(|hash| serde_json::json!({ "hash": hash })).collect();

		self.set_search_reply(200, serde_json::json!({ "count": count, "data": data }));
	}

	pub fn insert_listing(&self, hash: &str, listing: Value) {
		lock(&self.state.listings).insert(hash.to_string(), (StatusCode::OK, listing));
	}

	pub fn fail_listing(&self, hash: &str, status: u16) {
		lock(&self.state.listings).insert(
			hash.to_string(),
			(to_status(status), serde_json::json!({ "success": false, "reason": "failed" })),
		);
	}

	pub fn searches(&self) -> Vec<RecordedSearch> {
		lock(&self.state.searches).clone()
	}

	pub fn listing_requests(&self) -> Vec<String> {
		lock(&self.state.listing_requests).clone()
	}

	fn endpoint(&self, path: &str) -> EndpointConfig {
		EndpointConfig {
			api_base: self.base_url(),
			path: path.to_string(),
			timeout_ms: 5_000,
			default_headers: Map::new(),
		}
	}
}
impl Drop for MockMarket {
	fn drop(&mut self) {
		if let Some(shutdown) = self.shutdown.take() {
			let _ = shutdown.send(());
		}
	}
}

async fn search(
	State(state): State<Arc<MockState>>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
	let headers = headers
		.iter()
		.filter_map(|(name, value)| {
			value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
		})
		.collect();

	lock(&state.searches).push(RecordedSearch { body, headers });

	let (status, reply) = lock(&state.search_reply)
		.clone()
		.unwrap_or_else(|| (StatusCode::OK, serde_json::json!({ "count": 0, "data": [] })));

	(status, Json(reply))
}

async fn listing(
	State(state): State<Arc<MockState>>,
	Path(hash): Path<String>,
) -> (StatusCode, Json<Value>) {
	lock(&state.listing_requests).push(hash.clone());

	match lock(&state.listings).get(&hash).cloned() {
		Some((status, listing)) => (status, Json(listing)),
		None => (
			StatusCode::NOT_FOUND,
			Json(serde_json::json!({ "success": false, "reason": "not found" })),
		),
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

fn to_status(status: u16) -> StatusCode {
	StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
