use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
	Result,
	filter::{self, FilterInputs, PriceRange},
	plus_code::LatLng,
	state::{SearchState, Transform},
};

/// The payload submitted to the remote search endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchRequest {
	pub query: String,
	pub filters: Vec<String>,
	pub limit: u64,
	pub start: u64,
	pub sort: String,
	pub transforms: Vec<Transform>,
}
impl SearchRequest {
	/// Composes a payload from a snapshot of the session state.
	///
	/// The snapshot is consumed: its price keys are taken out and folded into a single range
	/// predicate, which is why callers hand over a clone rather than their live state.
	pub fn compose(snapshot: SearchState, reference: Option<LatLng>) -> Result<Self> {
		let mut snapshot = snapshot;
		let price = PriceRange::take_from(&mut snapshot.filters);
		let filters = filter::build_filters(&FilterInputs {
			filters: &snapshot.filters,
			modifiers: &snapshot.modifiers,
			price,
			location_radius: snapshot.location_radius,
			plus_code: snapshot.plus_code.as_deref(),
			reference,
			advanced_search: &snapshot.advanced_search,
		})?;
		let paginate = *snapshot.paginate();

		Ok(Self {
			query: snapshot.query.clone(),
			filters,
			limit: paginate.limit,
			start: paginate.start,
			sort: snapshot.sort().to_string(),
			transforms: snapshot.transforms,
		})
	}
}

/// The body returned by the remote search endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	#[serde(default)]
	pub count: u64,
	/// Lightweight result entries, each carrying at least a `hash`.
	#[serde(default)]
	pub data: Option<Vec<Value>>,
	#[serde(default)]
	pub limit: Option<u64>,
	#[serde(default)]
	pub next_start: Option<u64>,
}
impl SearchResponse {
	/// The content hash of each returned entry, `None` where an entry carries none.
	pub fn hashes(&self) -> Vec<Option<String>> {
		self.data
			.iter()
			.flatten()
			.map(|entry| entry.get("hash").and_then(Value::as_str).map(str::to_string))
			.collect()
	}
}
