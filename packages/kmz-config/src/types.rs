use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	pub remote: Remote,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
	/// Endpoint that accepts composed queries and returns result hashes.
	pub search: EndpointConfig,
	/// Endpoint that resolves a result hash into a full listing. The hash is appended to `path`.
	pub listing: EndpointConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
	pub api_base: String,
	pub path: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl EndpointConfig {
	pub fn url(&self) -> String {
		format!("{}{}", self.api_base, self.path)
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub page_limit: u32,
	/// Negative values disable radius-bound predicates.
	pub location_radius: f64,
	/// Sort token in `<field>_<operator>` form.
	pub sort: String,
	pub filters: Map<String, Value>,
	pub modifiers: BTreeMap<String, String>,
	pub advanced: Vec<String>,
	/// Used to recover short plus codes into full ones.
	pub reference_location: Option<ReferenceLocation>,
}
impl Default for Search {
	fn default() -> Self {
		let mut filters = Map::new();

		filters.insert("metadata.contractType".to_string(), Value::from("SERVICE"));
		filters.insert("priceMin".to_string(), Value::from("0"));

		let mut modifiers = BTreeMap::new();

		modifiers.insert("metadata.contractType".to_string(), "==".to_string());
		modifiers.insert("priceMin".to_string(), "<=".to_string());

		Self {
			page_limit: 24,
			location_radius: -1.0,
			sort: "item.title_<=".to_string(),
			filters,
			modifiers,
			advanced: Vec::new(),
			reference_location: None,
		}
	}
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReferenceLocation {
	pub latitude: f64,
	pub longitude: f64,
}

fn default_timeout_ms() -> u64 {
	10_000
}
