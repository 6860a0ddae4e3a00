//! Graph fetching with last-query-wins sequencing.
//!
//! Every query is issued a ticket from a [`QuerySequencer`]. When a response
//! arrives its ticket is compared with the latest one and stale results are
//! dropped, so a slow answer to an old query can never replace a newer graph.
//! Network and decode failures degrade to the built-in demonstration graph.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::fallback::demo_snapshot;
use super::model::Snapshot;
use super::normalize::snapshot_from_json;
use super::types::RawEndpoint;

/// Why a backend request produced no usable body.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("no browser window available")]
	NoWindow,

	#[error("request to {url} failed: {message}")]
	Network { url: String, message: String },

	#[error("{url} answered with HTTP {status}")]
	Status { url: String, status: u16 },

	#[error("could not read response body: {0}")]
	Body(String),

	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

/// A backend that answers graph and relevance queries with raw JSON text.
pub trait GraphSource {
	/// Body of the graph endpoint for `query`.
	fn fetch_graph(&self, query: &str) -> impl Future<Output = Result<String, FetchError>>;

	/// Body of the relevance search endpoint for `query`.
	fn search(&self, query: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// [`GraphSource`] backed by the browser's `fetch`.
#[derive(Clone, Debug)]
pub struct HttpGraphSource {
	api_base: String,
}

impl HttpGraphSource {
	pub fn new(api_base: impl Into<String>) -> Self {
		let api_base = api_base.into();
		Self {
			api_base: api_base.trim_end_matches('/').to_string(),
		}
	}

	fn graph_url(&self, query: &str) -> String {
		let encoded = String::from(js_sys::encode_uri_component(query));
		format!("{}/graph?query={}", self.api_base, encoded)
	}

	fn search_url(&self) -> String {
		format!("{}/search/gemini", self.api_base)
	}
}

fn js_message(value: &JsValue) -> String {
	value
		.as_string()
		.or_else(|| {
			value
				.dyn_ref::<js_sys::Error>()
				.map(|e| String::from(e.message()))
		})
		.unwrap_or_else(|| format!("{:?}", value))
}

async fn send(url: String, init: RequestInit) -> Result<String, FetchError> {
	let network = |e: JsValue| FetchError::Network {
		url: url.clone(),
		message: js_message(&e),
	};
	let window = web_sys::window().ok_or(FetchError::NoWindow)?;
	let request = Request::new_with_str_and_init(&url, &init).map_err(network)?;
	request
		.headers()
		.set("Accept", "application/json")
		.map_err(network)?;

	let response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(network)?;
	let response: Response = response.dyn_into().map_err(network)?;
	if !response.ok() {
		return Err(FetchError::Status {
			url,
			status: response.status(),
		});
	}

	let body = response
		.text()
		.map_err(|e| FetchError::Body(js_message(&e)))?;
	let text = JsFuture::from(body)
		.await
		.map_err(|e| FetchError::Body(js_message(&e)))?;
	text.as_string()
		.ok_or_else(|| FetchError::Body("response body is not text".to_string()))
}

impl GraphSource for HttpGraphSource {
	async fn fetch_graph(&self, query: &str) -> Result<String, FetchError> {
		let init = RequestInit::new();
		init.set_method("GET");
		send(self.graph_url(query), init).await
	}

	async fn search(&self, query: &str) -> Result<String, FetchError> {
		let init = RequestInit::new();
		init.set_method("POST");
		let payload = serde_json::json!({ "query": query }).to_string();
		init.set_body(&JsValue::from_str(&payload));
		let headers = web_sys::Headers::new().map_err(|e| FetchError::Network {
			url: self.search_url(),
			message: js_message(&e),
		})?;
		headers
			.set("Content-Type", "application/json")
			.map_err(|e| FetchError::Network {
				url: self.search_url(),
				message: js_message(&e),
			})?;
		init.set_headers(&headers);
		send(self.search_url(), init).await
	}
}

/// Issues monotonically increasing tickets; only the latest is current.
#[derive(Debug, Default)]
pub struct QuerySequencer {
	latest: Cell<u64>,
}

impl QuerySequencer {
	pub fn issue(&self) -> u64 {
		let ticket = self.latest.get() + 1;
		self.latest.set(ticket);
		ticket
	}

	pub fn is_current(&self, ticket: u64) -> bool {
		self.latest.get() == ticket
	}
}

/// Fetches snapshots for queries, caching successful results per query.
pub struct GraphLoader<S> {
	source: S,
	sequencer: QuerySequencer,
	cache: RefCell<HashMap<String, Snapshot>>,
}

impl<S: GraphSource> GraphLoader<S> {
	pub fn new(source: S) -> Self {
		Self {
			source,
			sequencer: QuerySequencer::default(),
			cache: RefCell::new(HashMap::new()),
		}
	}

	/// Starts a query. Call synchronously when the query changes, then pass
	/// the ticket to [`GraphLoader::resolve`].
	pub fn begin(&self) -> u64 {
		self.sequencer.issue()
	}

	/// Fetches the snapshot for `query`. Resolves to `None` when a newer query
	/// began while this one was in flight.
	pub async fn resolve(&self, ticket: u64, query: &str) -> Option<Snapshot> {
		let snapshot = self.fetch(query).await;
		if self.sequencer.is_current(ticket) {
			Some(snapshot)
		} else {
			debug!("kg-canvas: discarding stale result for {:?} (ticket {})", query, ticket);
			None
		}
	}

	/// Snapshot for `query`, never failing: unusable responses become the
	/// demonstration graph, which is not cached.
	async fn fetch(&self, query: &str) -> Snapshot {
		let cached = self.cache.borrow().get(query).cloned();
		if let Some(snapshot) = cached {
			debug!("kg-canvas: cache hit for {:?}", query);
			return snapshot;
		}

		let parsed = match self.source.fetch_graph(query).await {
			Ok(body) => snapshot_from_json(&body),
			Err(e) => {
				warn!("kg-canvas: graph fetch failed: {}", e);
				None
			}
		};
		match parsed {
			Some(snapshot) => {
				info!(
					"kg-canvas: loaded {} nodes, {} edges for {:?}",
					snapshot.nodes.len(),
					snapshot.edges.len(),
					query
				);
				self.cache
					.borrow_mut()
					.insert(query.to_string(), snapshot.clone());
				snapshot
			}
			None => {
				warn!("kg-canvas: using demo graph for {:?}", query);
				demo_snapshot()
			}
		}
	}
}

#[derive(Deserialize)]
struct SearchResponse {
	#[serde(default)]
	relevant_nodes: Vec<Value>,
}

/// Extracts node ids from a relevance search response. Entries may be bare
/// ids or node objects carrying an `id`; anything else is skipped.
pub fn parse_relevant_ids(body: &str) -> Result<Vec<String>, FetchError> {
	let response: SearchResponse = serde_json::from_str(body)?;
	Ok(response
		.relevant_nodes
		.into_iter()
		.filter_map(|value| match serde_json::from_value::<RawEndpoint>(value) {
			Ok(endpoint) => endpoint.into_key(),
			Err(e) => {
				debug!("kg-canvas: skipping relevance entry: {}", e);
				None
			}
		})
		.collect())
}

/// Asks the backend which nodes are relevant to `query`.
pub async fn fetch_relevant_ids<S: GraphSource>(
	source: &S,
	query: &str,
) -> Result<Vec<String>, FetchError> {
	let body = source.search(query).await?;
	let ids = parse_relevant_ids(&body)?;
	info!("kg-canvas: {} nodes relevant to {:?}", ids.len(), query);
	Ok(ids)
}

#[cfg(test)]
mod tests {
	use futures::channel::oneshot;
	use futures::executor::block_on;

	use super::*;

	fn body(ids: &[&str]) -> String {
		let nodes: Vec<Value> = ids
			.iter()
			.map(|id| serde_json::json!({ "id": id, "name": id.to_uppercase(), "type": "document" }))
			.collect();
		serde_json::json!({ "graph": { "nodes": nodes, "links": [] } }).to_string()
	}

	/// Responds to each query once, when the test sends its body.
	#[derive(Default)]
	struct GatedSource {
		pending: RefCell<HashMap<String, oneshot::Receiver<Result<String, FetchError>>>>,
	}

	impl GatedSource {
		fn gate(&self, query: &str) -> oneshot::Sender<Result<String, FetchError>> {
			let (tx, rx) = oneshot::channel();
			self.pending.borrow_mut().insert(query.to_string(), rx);
			tx
		}
	}

	impl GraphSource for GatedSource {
		async fn fetch_graph(&self, query: &str) -> Result<String, FetchError> {
			let rx = self.pending.borrow_mut().remove(query);
			match rx {
				Some(rx) => rx.await.unwrap_or(Err(FetchError::NoWindow)),
				None => Err(FetchError::NoWindow),
			}
		}

		async fn search(&self, _query: &str) -> Result<String, FetchError> {
			Err(FetchError::NoWindow)
		}
	}

	/// Answers immediately and counts graph requests.
	struct CountingSource {
		calls: Cell<usize>,
		reply: fn(&str) -> Result<String, FetchError>,
	}

	impl GraphSource for CountingSource {
		async fn fetch_graph(&self, query: &str) -> Result<String, FetchError> {
			self.calls.set(self.calls.get() + 1);
			(self.reply)(query)
		}

		async fn search(&self, _query: &str) -> Result<String, FetchError> {
			Ok(r#"{"relevant_nodes": ["doc_1", {"id": "entity_gdpr"}, 7, {"name": "x"}, null]}"#.into())
		}
	}

	fn load<S: GraphSource>(loader: &GraphLoader<S>, query: &str) -> Option<Snapshot> {
		block_on(loader.resolve(loader.begin(), query))
	}

	fn ids(snapshot: &Snapshot) -> Vec<&str> {
		snapshot.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn sequencer_tracks_latest_ticket() {
		let sequencer = QuerySequencer::default();
		let a = sequencer.issue();
		let b = sequencer.issue();
		assert!(b > a);
		assert!(!sequencer.is_current(a));
		assert!(sequencer.is_current(b));
	}

	#[test]
	fn late_result_of_older_query_is_discarded() {
		let loader = GraphLoader::new(GatedSource::default());
		let send_a = loader.source.gate("A");
		let send_b = loader.source.gate("B");

		let (ticket_a, ticket_b) = (loader.begin(), loader.begin());
		let pending_a = loader.resolve(ticket_a, "A");
		let pending_b = loader.resolve(ticket_b, "B");

		send_b.send(Ok(body(&["b1", "b2"]))).unwrap();
		let shown = block_on(pending_b).expect("latest query is applied");
		assert_eq!(ids(&shown), vec!["b1", "b2"]);

		send_a.send(Ok(body(&["a1"]))).unwrap();
		assert_eq!(block_on(pending_a), None);
	}

	#[test]
	fn result_applies_when_no_newer_query_exists() {
		let loader = GraphLoader::new(GatedSource::default());
		let send_a = loader.source.gate("A");
		let pending_a = loader.resolve(loader.begin(), "A");
		send_a.send(Ok(body(&["a1"]))).unwrap();
		let shown = block_on(pending_a).unwrap();
		assert_eq!(ids(&shown), vec!["a1"]);
	}

	#[test]
	fn failures_fall_back_to_demo_graph() {
		let loader = GraphLoader::new(CountingSource {
			calls: Cell::new(0),
			reply: |_| {
				Err(FetchError::Status {
					url: "http://localhost:8000/graph".into(),
					status: 502,
				})
			},
		});
		assert_eq!(load(&loader, "q"), Some(demo_snapshot()));

		let garbage = GraphLoader::new(CountingSource {
			calls: Cell::new(0),
			reply: |_| Ok("<html>bad gateway</html>".into()),
		});
		assert_eq!(load(&garbage, "q"), Some(demo_snapshot()));
	}

	#[test]
	fn successful_results_are_cached_per_query() {
		let loader = GraphLoader::new(CountingSource {
			calls: Cell::new(0),
			reply: |query| Ok(body(&[query])),
		});
		let first = load(&loader, "gdpr").unwrap();
		let second = load(&loader, "gdpr").unwrap();
		assert_eq!(first, second);
		assert_eq!(loader.source.calls.get(), 1);

		load(&loader, "privacy");
		assert_eq!(loader.source.calls.get(), 2);
	}

	#[test]
	fn fallback_results_are_not_cached() {
		let loader = GraphLoader::new(CountingSource {
			calls: Cell::new(0),
			reply: |_| Err(FetchError::NoWindow),
		});
		load(&loader, "q");
		load(&loader, "q");
		assert_eq!(loader.source.calls.get(), 2);
	}

	#[test]
	fn relevant_ids_accept_strings_numbers_and_objects() {
		let source = CountingSource {
			calls: Cell::new(0),
			reply: |_| Err(FetchError::NoWindow),
		};
		let ids = block_on(fetch_relevant_ids(&source, "privacy")).unwrap();
		assert_eq!(ids, vec!["doc_1", "entity_gdpr", "7"]);
	}

	#[test]
	fn relevance_response_must_be_json() {
		assert!(matches!(
			parse_relevant_ids("not json"),
			Err(FetchError::Json(_))
		));
		assert_eq!(parse_relevant_ids("{}").unwrap(), Vec::<String>::new());
	}
}
