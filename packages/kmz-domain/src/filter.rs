use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{
	Error, Result,
	plus_code::{self, LatLng},
};

pub const PRICE_MIN_KEY: &str = "priceMin";
pub const PRICE_MAX_KEY: &str = "priceMax";
pub const CATEGORIES_KEY: &str = "item.categories";
pub const ZIP_CODE_KEY: &str = "location.zipCode";
pub const COUNTRY_KEY: &str = "location.country";

// Display amounts are scaled into the record's integer price unit.
const PRICE_SCALE: f64 = 100.0;

/// Price bounds in integer price units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriceRange {
	pub min: Option<i64>,
	pub max: Option<i64>,
}
impl PriceRange {
	/// Removes the reserved price keys from `filters`, keeping the order of the remaining keys.
	pub fn take_from(filters: &mut Map<String, Value>) -> Self {
		let min = filters.shift_remove(PRICE_MIN_KEY);
		let max = filters.shift_remove(PRICE_MAX_KEY);

		Self { min: min.as_ref().and_then(scale_price), max: max.as_ref().and_then(scale_price) }
	}

	/// A single predicate covering both bounds. Negative bounds count as unset.
	pub fn predicate(&self) -> Option<String> {
		let min = self.min.filter(|value| *value >= 0);
		let max = self.max.filter(|value| *value >= 0);

		match (min, max) {
			(Some(min), Some(max)) =>
				Some(format!("doc.item.price >= {min} && doc.item.price <= {max}")),
			(Some(min), None) => Some(format!("doc.item.price >= {min}")),
			(None, Some(max)) => Some(format!("doc.item.price <= {max}")),
			(None, None) => None,
		}
	}
}

pub struct FilterInputs<'a> {
	/// Field filters with the price keys already taken out.
	pub filters: &'a Map<String, Value>,
	pub modifiers: &'a BTreeMap<String, String>,
	pub price: PriceRange,
	pub location_radius: f64,
	pub plus_code: Option<&'a str>,
	pub reference: Option<LatLng>,
	pub advanced_search: &'a [String],
}

/// Builds the predicate list in submission order: field filters (with the zip radius substitution
/// applied in place), the price range, the plus-code area, then the advanced overrides verbatim.
pub fn build_filters(inputs: &FilterInputs<'_>) -> Result<Vec<String>> {
	// Adding zero turns a negative zero into `0` so it never renders as `-0`.
	let radius = (inputs.location_radius >= 0.0).then_some(inputs.location_radius + 0.0);
	let mut predicates =
		Vec::with_capacity(inputs.filters.len() + inputs.advanced_search.len() + 2);

	for (key, value) in inputs.filters {
		if key == PRICE_MIN_KEY || key == PRICE_MAX_KEY {
			continue;
		}

		let Some(text) = filter_text(key, value)? else {
			continue;
		};

		if key == CATEGORIES_KEY {
			predicates.push(format!("containsInArr(doc.item.categories, {})", quote(&text)));

			continue;
		}

		if key == ZIP_CODE_KEY
			&& let Some(radius) = radius
		{
			let country = match inputs.filters.get(COUNTRY_KEY) {
				Some(value) => filter_text(COUNTRY_KEY, value)?.unwrap_or_default(),
				None => String::new(),
			};

			predicates.push(format!(
				"zipWithin({}, {}, doc.location.zipCode, doc.location.country, {radius})",
				quote(&text),
				quote(&country),
			));

			continue;
		}

		let modifier =
			inputs.modifiers.get(key).ok_or_else(|| Error::MissingModifier { key: key.clone() })?;

		predicates.push(format!("doc.{key} {modifier} {}", quote(&text)));
	}

	if let Some(price) = inputs.price.predicate() {
		predicates.push(price);
	}

	if let Some(code) = inputs.plus_code.map(str::trim).filter(|code| !code.is_empty()) {
		let center = plus_code::decode_with_reference(code, inputs.reference)?.center();

		predicates.push(format!(
			"geoWithin(\"{}\", \"{}\", doc.location.latitude, doc.location.longitude, {})",
			center.latitude,
			center.longitude,
			radius.unwrap_or(0.0),
		));
	}

	predicates.extend(inputs.advanced_search.iter().cloned());

	Ok(predicates)
}

/// Renders a scalar filter value; `None` means the filter is unset and emits nothing.
fn filter_text(key: &str, value: &Value) -> Result<Option<String>> {
	match value {
		Value::Null => Ok(None),
		Value::String(text) if text.is_empty() => Ok(None),
		Value::String(text) => Ok(Some(text.clone())),
		Value::Number(number) => Ok(Some(number.to_string())),
		Value::Bool(flag) => Ok(Some(flag.to_string())),
		Value::Array(_) | Value::Object(_) =>
			Err(Error::InvalidFilterValue { key: key.to_string() }),
	}
}

fn scale_price(value: &Value) -> Option<i64> {
	let amount = match value {
		Value::String(text) if !text.trim().is_empty() => text.trim().parse::<f64>().ok()?,
		Value::Number(number) => number.as_f64()?,
		_ => return None,
	};
	let scaled = (amount * PRICE_SCALE).round();

	scaled.is_finite().then_some(scaled as i64)
}

fn quote(text: &str) -> String {
	let mut out = String::with_capacity(text.len() + 2);

	out.push('"');

	for c in text.chars() {
		if matches!(c, '"' | '\\') {
			out.push('\\');
		}

		out.push(c);
	}

	out.push('"');

	out
}
