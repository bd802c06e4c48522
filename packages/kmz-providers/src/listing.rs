use serde_json::Value;

use kmz_config::EndpointConfig;

use crate::{Error, Result};

/// Fetches the full listing behind a result hash.
pub async fn retrieve(cfg: &EndpointConfig, hash: &str) -> Result<Value> {
	if hash.trim().is_empty() || hash.contains('/') {
		return Err(Error::InvalidHash { hash: hash.to_string() });
	}

	let client = crate::client(cfg)?;
	let url = format!("{}{hash}", cfg.url());
	let json: Value = client.get(url).send().await?.error_for_status()?.json().await?;

	parse_listing_response(json)
}

fn parse_listing_response(json: Value) -> Result<Value> {
	if !json.is_object() {
		return Err(Error::InvalidResponse {
			message: "Listing response must be a JSON object.".to_string(),
		});
	}

	Ok(json)
}
