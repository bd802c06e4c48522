use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
	Result,
	paginate::{Direction, PageMove, Paginate},
	sort::SortSpec,
};

/// A post-processing directive the remote service applies to each result record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transform {
	pub operation: String,
	pub spec: Map<String, Value>,
}
impl Transform {
	/// Keeps the content hash of each record under `hash`.
	pub fn shift_hash() -> Self {
		let mut spec = Map::new();

		spec.insert("hash".to_string(), Value::from("hash"));

		Self { operation: "shift".to_string(), spec }
	}
}

/// The last fetched page. `data` lines up with the identifiers the service returned; a slot is
/// `None` when that record failed to resolve.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
	pub data: Vec<Option<Value>>,
	pub count: u64,
	pub limit: u64,
	pub next_start: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
	pub query: String,
	pub filters: Map<String, Value>,
	pub modifiers: BTreeMap<String, String>,
	/// Negative values disable radius-bound predicates.
	pub location_radius: f64,
	pub plus_code: Option<String>,
	pub advanced_search: Vec<String>,
	pub transforms: Vec<Transform>,
	sort: String,
	sort_indicator: String,
	paginate: Paginate,
	results: SearchResults,
}
impl SearchState {
	pub fn from_config(cfg: &kmz_config::Search) -> Result<Self> {
		let sort = SortSpec::parse(&cfg.sort)?;
		let mut state = Self {
			query: String::new(),
			filters: cfg.filters.clone(),
			modifiers: cfg.modifiers.clone(),
			location_radius: cfg.location_radius,
			plus_code: None,
			advanced_search: cfg.advanced.clone(),
			transforms: vec![Transform::shift_hash()],
			sort: String::new(),
			sort_indicator: String::new(),
			paginate: Paginate::new(u64::from(cfg.page_limit)),
			results: SearchResults::default(),
		};

		state.apply_sort(&sort);

		Ok(state)
	}

	pub fn sort(&self) -> &str {
		&self.sort
	}

	pub fn sort_indicator(&self) -> &str {
		&self.sort_indicator
	}

	/// Sets the comparator expression and its token together.
	pub fn apply_sort(&mut self, spec: &SortSpec) {
		self.sort = spec.expression();
		self.sort_indicator = spec.token();
	}

	pub fn paginate(&self) -> &Paginate {
		&self.paginate
	}

	pub fn results(&self) -> &SearchResults {
		&self.results
	}

	/// Moves the page window against the count of the last fetched page.
	pub fn advance_page(&mut self, direction: Direction) -> PageMove {
		let count = self.results.count;

		self.paginate.advance(direction, count)
	}

	/// Installs a freshly fetched page together with the page total derived from its count.
	pub fn record_page(&mut self, results: SearchResults) {
		self.paginate.record_total(results.count);
		self.results = results;
	}
}
impl Default for SearchState {
	fn default() -> Self {
		let cfg = kmz_config::Search::default();
		let sort = SortSpec::new("item.title", "<=");

		Self {
			query: String::new(),
			filters: cfg.filters,
			modifiers: cfg.modifiers,
			location_radius: cfg.location_radius,
			plus_code: None,
			advanced_search: cfg.advanced,
			transforms: vec![Transform::shift_hash()],
			sort: sort.expression(),
			sort_indicator: sort.token(),
			paginate: Paginate::new(u64::from(cfg.page_limit)),
			results: SearchResults::default(),
		}
	}
}
