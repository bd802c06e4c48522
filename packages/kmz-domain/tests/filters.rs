use std::collections::BTreeMap;

use serde_json::{Map, Value};

use kmz_domain::{
	Error, LatLng, PriceRange, SearchRequest, SearchState, SortSpec,
	filter::{self, FilterInputs},
};

fn filters(entries: &[(&str, Value)]) -> Map<String, Value> {
	entries.iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
}

fn modifiers(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
	entries.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
}

fn build(
	filters: &Map<String, Value>,
	modifiers: &BTreeMap<String, String>,
	price: PriceRange,
	location_radius: f64,
	plus_code: Option<&str>,
	advanced_search: &[String],
) -> Result<Vec<String>, Error> {
	filter::build_filters(&FilterInputs {
		filters,
		modifiers,
		price,
		location_radius,
		plus_code,
		reference: None,
		advanced_search,
	})
}

fn state_with(entries: &[(&str, Value)], mods: &[(&str, &str)]) -> SearchState {
	let mut state = SearchState::default();

	state.filters = filters(entries);
	state.modifiers = modifiers(mods);

	state
}

#[test]
fn contract_type_with_price_floor() {
	let state = state_with(
		&[("metadata.contractType", Value::from("SERVICE")), ("priceMin", Value::from("10"))],
		&[("metadata.contractType", "==")],
	);
	let request = SearchRequest::compose(state, None).expect("compose failed");

	assert_eq!(
		request.filters,
		vec![r#"doc.metadata.contractType == "SERVICE""#, "doc.item.price >= 1000"]
	);
}

#[test]
fn empty_values_are_omitted() {
	let filters = filters(&[
		("item.condition", Value::from("")),
		("metadata.contractType", Value::from("SERVICE")),
	]);
	let modifiers = modifiers(&[("item.condition", "=="), ("metadata.contractType", "==")]);
	let built = build(&filters, &modifiers, PriceRange::default(), -1.0, None, &[])
		.expect("build failed");

	assert_eq!(built, vec![r#"doc.metadata.contractType == "SERVICE""#]);
	assert!(built.iter().all(|predicate| !predicate.contains("item.condition")));
}

#[test]
fn categories_use_containment() {
	let filters = filters(&[("item.categories", Value::from("Art"))]);
	let modifiers = modifiers(&[("item.categories", "==")]);
	let built = build(&filters, &modifiers, PriceRange::default(), -1.0, None, &[])
		.expect("build failed");

	assert_eq!(built, vec![r#"containsInArr(doc.item.categories, "Art")"#]);
}

#[test]
fn categories_need_no_modifier() {
	let filters = filters(&[("item.categories", Value::from("Art"))]);
	let built = build(&filters, &BTreeMap::new(), PriceRange::default(), -1.0, None, &[])
		.expect("build failed");

	assert_eq!(built.len(), 1);
}

#[test]
fn price_floor_only_emits_one_lower_bound() {
	let built = build(
		&Map::new(),
		&BTreeMap::new(),
		PriceRange { min: Some(0), max: None },
		-1.0,
		None,
		&[],
	)
	.expect("build failed");

	assert_eq!(built, vec!["doc.item.price >= 0"]);
}

#[test]
fn price_bounds_combine_into_one_clause() {
	let state = state_with(
		&[("priceMin", Value::from("5")), ("priceMax", Value::from("12.5"))],
		&[("priceMin", "<=")],
	);
	let request = SearchRequest::compose(state, None).expect("compose failed");
	let price: Vec<_> = request.filters.iter().filter(|p| p.contains("doc.item.price")).collect();

	assert_eq!(price, vec!["doc.item.price >= 500 && doc.item.price <= 1250"]);
}

#[test]
fn zip_filter_is_replaced_by_radius_predicate() {
	let filters = filters(&[
		("location.zipCode", Value::from("1101")),
		("location.country", Value::from("PH")),
	]);
	let modifiers = modifiers(&[("location.zipCode", "=="), ("location.country", "==")]);
	let built = build(&filters, &modifiers, PriceRange::default(), 30.0, None, &[])
		.expect("build failed");

	assert_eq!(
		built,
		vec![
			r#"zipWithin("1101", "PH", doc.location.zipCode, doc.location.country, 30)"#,
			r#"doc.location.country == "PH""#,
		]
	);
	assert!(!built.iter().any(|predicate| predicate.starts_with("doc.location.zipCode")));
}

#[test]
fn zip_filter_stays_plain_without_radius() {
	let filters = filters(&[("location.zipCode", Value::from("1101"))]);
	let modifiers = modifiers(&[("location.zipCode", "==")]);
	let built = build(&filters, &modifiers, PriceRange::default(), -1.0, None, &[])
		.expect("build failed");

	assert_eq!(built, vec![r#"doc.location.zipCode == "1101""#]);
}

#[test]
fn plus_code_adds_geo_predicate_after_price() {
	let advanced = vec![r#"doc.nsfw == "false""#.to_string()];
	let built = build(
		&Map::new(),
		&BTreeMap::new(),
		PriceRange { min: Some(100), max: None },
		-5.0,
		Some("7FG49QCJ+2V"),
		&advanced,
	)
	.expect("build failed");

	assert_eq!(built.len(), 3);
	assert_eq!(built[0], "doc.item.price >= 100");
	assert!(built[1].starts_with(r#"geoWithin("20.37006"#), "unexpected {}", built[1]);
	assert!(built[1].ends_with("doc.location.latitude, doc.location.longitude, 0)"));
	assert_eq!(built[2], r#"doc.nsfw == "false""#);
}

#[test]
fn plus_code_uses_configured_radius() {
	let built = build(
		&Map::new(),
		&BTreeMap::new(),
		PriceRange::default(),
		12.5,
		Some("7FG49Q00+"),
		&[],
	)
	.expect("build failed");

	assert_eq!(
		built,
		vec![r#"geoWithin("20.375", "2.775", doc.location.latitude, doc.location.longitude, 12.5)"#]
	);
}

#[test]
fn short_plus_code_recovers_against_reference() {
	let built = filter::build_filters(&FilterInputs {
		filters: &Map::new(),
		modifiers: &BTreeMap::new(),
		price: PriceRange::default(),
		location_radius: 1.0,
		plus_code: Some("9G8F+6X"),
		reference: Some(LatLng { latitude: 47.4, longitude: 8.6 }),
		advanced_search: &[],
	})
	.expect("build failed");

	assert_eq!(built.len(), 1);
	assert!(built[0].starts_with(r#"geoWithin("47.36556"#), "unexpected {}", built[0]);
}

#[test]
fn malformed_plus_code_fails() {
	let err = build(&Map::new(), &BTreeMap::new(), PriceRange::default(), 1.0, Some("NOPE+"), &[])
		.expect_err("malformed code must fail");

	assert!(matches!(err, Error::InvalidGeoCode { .. }));
}

#[test]
fn comparison_filter_requires_modifier() {
	let filters = filters(&[("item.condition", Value::from("NEW"))]);
	let err = build(&filters, &BTreeMap::new(), PriceRange::default(), -1.0, None, &[])
		.expect_err("missing modifier must fail");

	assert_eq!(err, Error::MissingModifier { key: "item.condition".to_string() });
}

#[test]
fn scalar_values_render_as_text() {
	let filters = filters(&[("item.grams", Value::from(250)), ("nsfw", Value::from(false))]);
	let modifiers = modifiers(&[("item.grams", ">="), ("nsfw", "==")]);
	let built = build(&filters, &modifiers, PriceRange::default(), -1.0, None, &[])
		.expect("build failed");

	assert_eq!(built, vec![r#"doc.item.grams >= "250""#, r#"doc.nsfw == "false""#]);
}

#[test]
fn advanced_search_is_appended_verbatim() {
	let advanced = vec!["a == b".to_string(), "containsInArr(doc.item.tags, \"x\")".to_string()];
	let filters = filters(&[("metadata.contractType", Value::from("SERVICE"))]);
	let modifiers = modifiers(&[("metadata.contractType", "==")]);
	let built = build(&filters, &modifiers, PriceRange::default(), -1.0, None, &advanced)
		.expect("build failed");

	assert_eq!(&built[1..], advanced.as_slice());
}

#[test]
fn compose_leaves_live_state_untouched() {
	let mut state = state_with(
		&[("metadata.contractType", Value::from("SERVICE")), ("priceMin", Value::from("1"))],
		&[("metadata.contractType", "==")],
	);

	state.query = "lamp".to_string();
	state.apply_sort(&SortSpec::parse("item.price_>=").expect("sort token"));

	let request = SearchRequest::compose(state.clone(), None).expect("compose failed");

	assert!(state.filters.contains_key("priceMin"));
	assert_eq!(request.query, "lamp");
	assert_eq!(request.sort, "x.item.price >= y.item.price");
	assert_eq!(request.limit, 24);
	assert_eq!(request.start, 0);
	assert_eq!(request.transforms, state.transforms);
}

#[test]
fn request_serializes_to_wire_shape() {
	let request = SearchRequest::compose(SearchState::default(), None).expect("compose failed");
	let json = serde_json::to_value(&request).expect("serialize failed");

	assert_eq!(
		json,
		serde_json::json!({
			"query": "",
			"filters": ["doc.metadata.contractType == \"SERVICE\"", "doc.item.price >= 0"],
			"limit": 24,
			"start": 0,
			"sort": "x.item.title <= y.item.title",
			"transforms": [{ "operation": "shift", "spec": { "hash": "hash" } }],
		})
	);
}

#[test]
fn negative_zero_radius_renders_as_zero() {
	let filters = filters(&[("location.zipCode", Value::from("1101"))]);
	let modifiers = modifiers(&[("location.zipCode", "==")]);
	let built = build(&filters, &modifiers, PriceRange::default(), -0.0, Some("7FG49Q00+"), &[])
		.expect("build failed");

	assert_eq!(
		built,
		vec![
			r#"zipWithin("1101", "", doc.location.zipCode, doc.location.country, 0)"#,
			r#"geoWithin("20.375", "2.775", doc.location.latitude, doc.location.longitude, 0)"#,
		]
	);
}

#[test]
fn non_finite_reference_is_rejected() {
	let err = filter::build_filters(&FilterInputs {
		filters: &Map::new(),
		modifiers: &BTreeMap::new(),
		price: PriceRange::default(),
		location_radius: 1.0,
		plus_code: Some("9G8F+6X"),
		reference: Some(LatLng { latitude: 47.4, longitude: f64::INFINITY }),
		advanced_search: &[],
	})
	.expect_err("an infinite reference must fail");

	assert!(matches!(err, Error::InvalidCoordinate { .. }));
}
