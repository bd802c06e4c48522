use std::panic::AssertUnwindSafe;

use futures::{FutureExt, future};
use serde_json::Value;
use uuid::Uuid;

use kmz_config::{Config, EndpointConfig};
use kmz_domain::{
	Direction, LatLng, PageMove, Paginate, SearchRequest, SearchResponse, SearchResults,
	SearchState, SortSpec,
};

use crate::{Providers, RecordResolver, Result};

/// One logical search context: the live query state, its construction-time snapshot, and the
/// collaborators used to run it.
///
/// Operations take `&mut self`, so a session's owner serializes them. `search_id` lets that owner
/// tell results of the current search apart from ones started before a `reset`.
pub struct SearchSession {
	cfg: Config,
	providers: Providers,
	reference: Option<LatLng>,
	state: SearchState,
	original: SearchState,
	search_id: Uuid,
	response_status: Option<u16>,
}
impl SearchSession {
	pub fn new(cfg: Config) -> Result<Self> {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Result<Self> {
		let state = SearchState::from_config(&cfg.search)?;
		let reference = cfg.search.reference_location.map(LatLng::from);

		Ok(Self {
			cfg,
			providers,
			reference,
			original: state.clone(),
			state,
			search_id: Uuid::new_v4(),
			response_status: None,
		})
	}

	pub fn search_id(&self) -> Uuid {
		self.search_id
	}

	pub fn state(&self) -> &SearchState {
		&self.state
	}

	pub fn state_mut(&mut self) -> &mut SearchState {
		&mut self.state
	}

	pub fn original(&self) -> &SearchState {
		&self.original
	}

	pub fn results(&self) -> &SearchResults {
		self.state.results()
	}

	pub fn paginate(&self) -> &Paginate {
		self.state.paginate()
	}

	/// HTTP status of the last successful search submission.
	pub fn response_status(&self) -> Option<u16> {
		self.response_status
	}

	/// Runs one full query cycle and replaces the result page.
	///
	/// A non-empty `query` overwrites the stored free-text query first. On error the previous
	/// results are left as they were.
	pub async fn execute(&mut self, query: Option<&str>) -> Result<&SearchResults> {
		if let Some(query) = query.filter(|query| !query.is_empty()) {
			self.state.query = query.to_string();
		}

		let request = SearchRequest::compose(self.state.clone(), self.reference)?;

		tracing::debug!(
			search_id = %self.search_id,
			filters = ?request.filters,
			start = request.start,
			limit = request.limit,
			"Submitting search."
		);

		let reply = self.providers.search.search(&self.cfg.remote.search, &request).await?;

		self.response_status = Some(reply.status);

		let data = self.resolve_page(&reply.body).await;
		let returned = data.len() as u64;
		let resolved = data.iter().filter(|record| record.is_some()).count();
		let results = SearchResults {
			count: reply.body.count,
			limit: reply.body.limit.unwrap_or(request.limit),
			next_start: reply.body.next_start.unwrap_or(request.start + returned),
			data,
		};

		tracing::info!(
			search_id = %self.search_id,
			status = reply.status,
			count = results.count,
			returned,
			resolved,
			"Search completed."
		);

		self.state.record_page(results);

		Ok(self.state.results())
	}

	pub async fn next_page(&mut self) -> Result<PageMove> {
		self.turn_page(Direction::Forward).await
	}

	pub async fn previous_page(&mut self) -> Result<PageMove> {
		self.turn_page(Direction::Backward).await
	}

	/// Sorts by a `<field>_<operator>` token and re-runs the search.
	pub async fn sort_by(&mut self, token: &str) -> Result<&SearchResults> {
		let spec = SortSpec::parse(token)?;

		self.state.apply_sort(&spec);

		self.execute(None).await
	}

	/// Restores the construction-time state and starts a new logical search.
	pub fn reset(&mut self) {
		self.state = self.original.clone();
		self.search_id = Uuid::new_v4();
		self.response_status = None;

		tracing::debug!(search_id = %self.search_id, "Search session reset.");
	}

	/// Makes the current state the one `reset` returns to.
	pub fn save_as_original(&mut self) {
		self.original = self.state.clone();
	}

	async fn turn_page(&mut self, direction: Direction) -> Result<PageMove> {
		let movement = self.state.advance_page(direction);

		if movement == PageMove::Unchanged {
			tracing::debug!(
				search_id = %self.search_id,
				?direction,
				start = self.state.paginate().start,
				count = self.state.results().count,
				"Page move skipped."
			);

			return Ok(movement);
		}

		self.execute(None).await?;

		Ok(movement)
	}

	/// Resolves every returned hash concurrently. A failed lookup leaves `None` in its slot; a
	/// lookup that panics takes the whole page down to empty.
	async fn resolve_page(&self, response: &SearchResponse) -> Vec<Option<Value>> {
		let hashes = response.hashes();
		let resolver = self.providers.resolver.as_ref();
		let cfg = &self.cfg.remote.listing;
		let lookups = hashes.iter().map(|hash| resolve_one(resolver, cfg, hash.as_deref()));

		match AssertUnwindSafe(future::join_all(lookups)).catch_unwind().await {
			Ok(records) => records,
			Err(_) => {
				tracing::error!(
					search_id = %self.search_id,
					requested = hashes.len(),
					"Listing resolution aborted; returning an empty page."
				);

				Vec::new()
			},
		}
	}
}

async fn resolve_one(
	resolver: &dyn RecordResolver,
	cfg: &EndpointConfig,
	hash: Option<&str>,
) -> Option<Value> {
	let Some(hash) = hash else {
		tracing::warn!("Search result entry has no hash.");

		return None;
	};

	match resolver.resolve(cfg, hash).await {
		Ok(record) => Some(record),
		Err(err) => {
			tracing::warn!(error = %err, hash, "Listing resolution failed.");

			None
		},
	}
}
