use serde_json::Value;

use kmz_config::EndpointConfig;
use kmz_domain::{SearchRequest, SearchResponse};

use crate::{Error, Result};

/// A successful search round trip.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchReply {
	pub status: u16,
	pub body: SearchResponse,
}

pub async fn submit(cfg: &EndpointConfig, request: &SearchRequest) -> Result<SearchReply> {
	let client = crate::client(cfg)?;
	let res = client.post(cfg.url()).json(request).send().await?;
	let status = res.status().as_u16();
	let json: Value = res.error_for_status()?.json().await?;

	tracing::debug!(status, url = %cfg.url(), "Search endpoint responded.");

	Ok(SearchReply { status, body: parse_search_response(json)? })
}

fn parse_search_response(json: Value) -> Result<SearchResponse> {
	if !json.is_object() {
		return Err(Error::InvalidResponse {
			message: "Search response must be a JSON object.".to_string(),
		});
	}

	let body: SearchResponse = serde_json::from_value(json)?;

	if let Some(data) = body.data.as_ref()
		&& data.iter().any(|entry| !entry.is_object())
	{
		return Err(Error::InvalidResponse {
			message: "Search response data entries must be objects.".to_string(),
		});
	}

	Ok(body)
}
