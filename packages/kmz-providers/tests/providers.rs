use reqwest::header::USER_AGENT;
use serde_json::{Map, Value};

use kmz_domain::{SearchRequest, SearchState};
use kmz_providers::{Error, listing, search};
use kmz_testkit::MockMarket;

#[test]
fn builds_default_headers() {
	let mut raw = Map::new();

	raw.insert("X-Client".to_string(), Value::from("kmz"));

	let headers = kmz_providers::default_headers(&raw).expect("Failed to build headers.");

	assert_eq!(headers.get("x-client").expect("Missing header."), "kmz");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut raw = Map::new();

	raw.insert(USER_AGENT.as_str().to_string(), Value::from(3));

	assert!(matches!(kmz_providers::default_headers(&raw), Err(Error::InvalidConfig { .. })));
}

#[tokio::test]
async fn submits_composed_request() {
	let market = MockMarket::start().await.expect("Failed to start mock market.");

	market.set_search_hashes(50, &["QmA", "QmB"]);

	let mut endpoint = market.search_endpoint();

	endpoint.default_headers.insert("X-Client".to_string(), Value::from("kmz"));

	let request =
		SearchRequest::compose(SearchState::default(), None).expect("Failed to compose request.");
	let reply = search::submit(&endpoint, &request).await.expect("Search failed.");

	assert_eq!(reply.status, 200);
	assert_eq!(reply.body.count, 50);
	assert_eq!(reply.body.hashes(), vec![Some("QmA".to_string()), Some("QmB".to_string())]);

	let searches = market.searches();

	assert_eq!(searches.len(), 1);
	assert_eq!(
		searches[0].body,
		serde_json::to_value(&request).expect("Failed to serialize request.")
	);
	assert_eq!(searches[0].headers.get("x-client").map(String::as_str), Some("kmz"));
}

#[tokio::test]
async fn surfaces_error_statuses() {
	let market = MockMarket::start().await.expect("Failed to start mock market.");

	market.set_search_reply(502, serde_json::json!({ "error": "upstream" }));

	let request =
		SearchRequest::compose(SearchState::default(), None).expect("Failed to compose request.");
	let err = search::submit(&market.search_endpoint(), &request)
		.await
		.expect_err("A 502 must fail the search.");

	assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn retrieves_listing_by_hash() {
	let market = MockMarket::start().await.expect("Failed to start mock market.");
	let listing = serde_json::json!({ "hash": "QmA", "item": { "title": "Lamp", "price": 1250 } });

	market.insert_listing("QmA", listing.clone());

	let fetched =
		listing::retrieve(&market.listing_endpoint(), "QmA").await.expect("Lookup failed.");

	assert_eq!(fetched, listing);
	assert_eq!(market.listing_requests(), vec!["QmA".to_string()]);
}

#[tokio::test]
async fn missing_listing_is_an_error() {
	let market = MockMarket::start().await.expect("Failed to start mock market.");
	let err = listing::retrieve(&market.listing_endpoint(), "QmMissing")
		.await
		.expect_err("Unknown hashes must fail.");

	assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn rejects_unusable_hashes_without_a_request() {
	let market = MockMarket::start().await.expect("Failed to start mock market.");

	for hash in ["", "a/b"] {
		let err = listing::retrieve(&market.listing_endpoint(), hash)
			.await
			.expect_err("Unusable hashes must fail.");

		assert!(matches!(err, Error::InvalidHash { .. }));
	}

	assert!(market.listing_requests().is_empty());
}
