//! Open Location Code ("plus code") validation, decoding, encoding and short-code recovery.
//!
//! Decoding runs on integer place values so that code areas line up exactly with the reference
//! grid; only the final conversion to degrees is floating point.

use crate::{Error, Result};

const SEPARATOR: char = '+';
const SEPARATOR_POSITION: usize = 8;
const PADDING: char = '0';
const ALPHABET: &[u8; 20] = b"23456789CFGHJMPQRVWX";
const ENCODING_BASE: i64 = 20;
const LATITUDE_MAX: f64 = 90.0;
const LONGITUDE_MAX: f64 = 180.0;
const MAX_DIGIT_COUNT: usize = 15;
const PAIR_CODE_LENGTH: usize = 10;
const GRID_CODE_LENGTH: usize = MAX_DIGIT_COUNT - PAIR_CODE_LENGTH;
const GRID_COLUMNS: i64 = 4;
const GRID_ROWS: i64 = 5;
// 20^4, 20^3.
const PAIR_FIRST_PLACE_VALUE: i64 = 160_000;
const PAIR_PRECISION: i64 = 8_000;
// 5^4, 4^4.
const GRID_LAT_FIRST_PLACE_VALUE: i64 = 625;
const GRID_LNG_FIRST_PLACE_VALUE: i64 = 256;
// PAIR_PRECISION * 5^5, PAIR_PRECISION * 4^5.
const FINAL_LAT_PRECISION: i64 = 25_000_000;
const FINAL_LNG_PRECISION: i64 = 8_192_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
	pub latitude: f64,
	pub longitude: f64,
}
impl From<kmz_config::ReferenceLocation> for LatLng {
	fn from(value: kmz_config::ReferenceLocation) -> Self {
		Self { latitude: value.latitude, longitude: value.longitude }
	}
}

/// The rectangle covered by a decoded code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CodeArea {
	pub latitude_lo: f64,
	pub longitude_lo: f64,
	pub latitude_hi: f64,
	pub longitude_hi: f64,
	pub code_length: usize,
}
impl CodeArea {
	pub fn latitude_center(&self) -> f64 {
		(self.latitude_lo + (self.latitude_hi - self.latitude_lo) / 2.0).min(LATITUDE_MAX)
	}

	pub fn longitude_center(&self) -> f64 {
		(self.longitude_lo + (self.longitude_hi - self.longitude_lo) / 2.0).min(LONGITUDE_MAX)
	}

	pub fn center(&self) -> LatLng {
		LatLng { latitude: self.latitude_center(), longitude: self.longitude_center() }
	}
}

pub fn is_valid(code: &str) -> bool {
	if !code.is_ascii() || code.len() == 1 {
		return false;
	}

	let Some(separator) = code.find(SEPARATOR) else {
		return false;
	};

	if code.matches(SEPARATOR).count() > 1 {
		return false;
	}
	if separator > SEPARATOR_POSITION || separator % 2 == 1 {
		return false;
	}

	if let Some(padding) = code.find(PADDING) {
		// Short codes never carry padding.
		if separator < SEPARATOR_POSITION || padding == 0 {
			return false;
		}

		let run = code[padding..].chars().take_while(|c| *c == PADDING).count();

		if code[padding + run..].contains(PADDING) {
			return false;
		}
		if run % 2 == 1 || run > SEPARATOR_POSITION - 2 {
			return false;
		}
		if !code.ends_with(SEPARATOR) {
			return false;
		}
	}

	if code.len() - separator - 1 == 1 {
		return false;
	}

	code.chars().all(|c| c == SEPARATOR || c == PADDING || digit_value(c).is_some())
}

pub fn is_short(code: &str) -> bool {
	is_valid(code) && code.find(SEPARATOR).is_some_and(|separator| separator < SEPARATOR_POSITION)
}

pub fn is_full(code: &str) -> bool {
	if !is_valid(code) || is_short(code) {
		return false;
	}

	let mut chars = code.chars();

	if let Some(first) = chars.next().and_then(digit_value)
		&& (first * ENCODING_BASE) as f64 >= LATITUDE_MAX * 2.0
	{
		return false;
	}
	if let Some(second) = chars.next().and_then(digit_value)
		&& (second * ENCODING_BASE) as f64 >= LONGITUDE_MAX * 2.0
	{
		return false;
	}

	true
}

/// Decodes a full code into the area it covers.
pub fn decode(code: &str) -> Result<CodeArea> {
	if !is_full(code) {
		let message = if is_short(code) {
			"short codes must be recovered against a reference location"
		} else {
			"not a valid full code"
		};

		return Err(invalid(code, message));
	}

	let digits = code
		.chars()
		.filter(|c| *c != SEPARATOR && *c != PADDING)
		.take(MAX_DIGIT_COUNT)
		.map(digit_value)
		.collect::<Option<Vec<_>>>()
		.ok_or_else(|| invalid(code, "contains characters outside the code alphabet"))?;
	let pair_digits = digits.len().min(PAIR_CODE_LENGTH);
	let mut normal_lat = -(LATITUDE_MAX as i64) * PAIR_PRECISION;
	let mut normal_lng = -(LONGITUDE_MAX as i64) * PAIR_PRECISION;
	let mut place_value = PAIR_FIRST_PLACE_VALUE;

	for (index, pair) in digits[..pair_digits].chunks_exact(2).enumerate() {
		if index > 0 {
			place_value /= ENCODING_BASE;
		}

		normal_lat += pair[0] * place_value;
		normal_lng += pair[1] * place_value;
	}

	let mut lat_precision = place_value as f64 / PAIR_PRECISION as f64;
	let mut lng_precision = place_value as f64 / PAIR_PRECISION as f64;
	let mut grid_lat = 0;
	let mut grid_lng = 0;

	if digits.len() > PAIR_CODE_LENGTH {
		let mut row_place_value = GRID_LAT_FIRST_PLACE_VALUE;
		let mut col_place_value = GRID_LNG_FIRST_PLACE_VALUE;

		for (index, digit) in digits[PAIR_CODE_LENGTH..].iter().enumerate() {
			if index > 0 {
				row_place_value /= GRID_ROWS;
				col_place_value /= GRID_COLUMNS;
			}

			grid_lat += (digit / GRID_COLUMNS) * row_place_value;
			grid_lng += (digit % GRID_COLUMNS) * col_place_value;
		}

		lat_precision = row_place_value as f64 / FINAL_LAT_PRECISION as f64;
		lng_precision = col_place_value as f64 / FINAL_LNG_PRECISION as f64;
	}

	let latitude_lo = normal_lat as f64 / PAIR_PRECISION as f64
		+ grid_lat as f64 / FINAL_LAT_PRECISION as f64;
	let longitude_lo = normal_lng as f64 / PAIR_PRECISION as f64
		+ grid_lng as f64 / FINAL_LNG_PRECISION as f64;

	Ok(CodeArea {
		latitude_lo,
		longitude_lo,
		latitude_hi: latitude_lo + lat_precision,
		longitude_hi: longitude_lo + lng_precision,
		code_length: digits.len(),
	})
}

/// Decodes a full code, or a short code recovered against `reference` when one is available.
pub fn decode_with_reference(code: &str, reference: Option<LatLng>) -> Result<CodeArea> {
	match reference {
		Some(reference) if is_short(code) => decode(&recover_nearest(code, reference)?),
		_ => decode(code),
	}
}

pub fn encode(latitude: f64, longitude: f64, code_length: usize) -> Result<String> {
	if code_length < 2 || (code_length < PAIR_CODE_LENGTH && code_length % 2 == 1) {
		return Err(Error::InvalidCodeLength { length: code_length });
	}

	ensure_finite(latitude, longitude)?;

	let code_length = code_length.min(MAX_DIGIT_COUNT);
	let mut latitude = clip_latitude(latitude);
	let longitude = normalize_longitude(longitude);

	// The north pole would otherwise encode into a cell above 90 degrees.
	if latitude == LATITUDE_MAX {
		latitude -= latitude_precision(code_length);
	}

	let mut lat_value = integer_place(latitude + LATITUDE_MAX, FINAL_LAT_PRECISION);
	let mut lng_value = integer_place(longitude + LONGITUDE_MAX, FINAL_LNG_PRECISION);
	let mut reversed = Vec::with_capacity(MAX_DIGIT_COUNT);

	if code_length > PAIR_CODE_LENGTH {
		for _ in 0..GRID_CODE_LENGTH {
			let index = (lat_value % GRID_ROWS) * GRID_COLUMNS + lng_value % GRID_COLUMNS;

			reversed.push(alphabet_char(index));
			lat_value /= GRID_ROWS;
			lng_value /= GRID_COLUMNS;
		}
	} else {
		lat_value /= GRID_ROWS.pow(GRID_CODE_LENGTH as u32);
		lng_value /= GRID_COLUMNS.pow(GRID_CODE_LENGTH as u32);
	}

	for _ in 0..PAIR_CODE_LENGTH / 2 {
		reversed.push(alphabet_char(lng_value % ENCODING_BASE));
		reversed.push(alphabet_char(lat_value % ENCODING_BASE));
		lat_value /= ENCODING_BASE;
		lng_value /= ENCODING_BASE;
	}

	let digits: String = reversed.into_iter().rev().collect();
	let mut code = String::with_capacity(MAX_DIGIT_COUNT + 1);

	if code_length >= SEPARATOR_POSITION {
		code.push_str(&digits[..SEPARATOR_POSITION]);
		code.push(SEPARATOR);
		code.push_str(&digits[SEPARATOR_POSITION..code_length]);
	} else {
		code.push_str(&digits[..code_length]);

		for _ in code_length..SEPARATOR_POSITION {
			code.push(PADDING);
		}

		code.push(SEPARATOR);
	}

	Ok(code)
}

/// Expands a short code into the full code nearest to `reference`.
pub fn recover_nearest(code: &str, reference: LatLng) -> Result<String> {
	if !is_short(code) {
		if is_full(code) {
			return Ok(code.to_ascii_uppercase());
		}

		return Err(invalid(code, "not a valid short or full code"));
	}

	ensure_finite(reference.latitude, reference.longitude)?;

	let reference_lat = clip_latitude(reference.latitude);
	let reference_lng = normalize_longitude(reference.longitude);
	let code = code.to_ascii_uppercase();
	let separator = code.find(SEPARATOR).ok_or_else(|| invalid(&code, "missing separator"))?;
	let padding_length = SEPARATOR_POSITION - separator;
	let resolution = (ENCODING_BASE as f64).powi(2 - (padding_length / 2) as i32);
	let half_resolution = resolution / 2.0;
	let prefix = encode(reference_lat, reference_lng, PAIR_CODE_LENGTH)?;
	let area = decode(&format!("{}{code}", &prefix[..padding_length]))?;
	let mut center_lat = area.latitude_center();
	let mut center_lng = area.longitude_center();

	if reference_lat + half_resolution < center_lat && center_lat - resolution >= -LATITUDE_MAX {
		center_lat -= resolution;
	} else if reference_lat - half_resolution > center_lat
		&& center_lat + resolution <= LATITUDE_MAX
	{
		center_lat += resolution;
	}

	if reference_lng + half_resolution < center_lng {
		center_lng -= resolution;
	} else if reference_lng - half_resolution > center_lng {
		center_lng += resolution;
	}

	encode(center_lat, center_lng, area.code_length)
}

fn invalid(code: &str, message: &str) -> Error {
	Error::InvalidGeoCode { code: code.to_string(), message: message.to_string() }
}

fn digit_value(c: char) -> Option<i64> {
	let upper = c.to_ascii_uppercase();

	ALPHABET.iter().position(|b| char::from(*b) == upper).map(|index| index as i64)
}

fn alphabet_char(index: i64) -> char {
	char::from(ALPHABET[index as usize])
}

fn clip_latitude(latitude: f64) -> f64 {
	latitude.clamp(-LATITUDE_MAX, LATITUDE_MAX)
}

fn ensure_finite(latitude: f64, longitude: f64) -> Result<()> {
	if latitude.is_finite() && longitude.is_finite() {
		return Ok(());
	}

	Err(Error::InvalidCoordinate { latitude, longitude })
}

// Expects a finite input. `rem_euclid` can round up to the divisor for tiny negative offsets.
fn normalize_longitude(longitude: f64) -> f64 {
	let wrapped = (longitude + LONGITUDE_MAX).rem_euclid(LONGITUDE_MAX * 2.0) - LONGITUDE_MAX;

	if wrapped >= LONGITUDE_MAX { wrapped - LONGITUDE_MAX * 2.0 } else { wrapped }
}

fn latitude_precision(code_length: usize) -> f64 {
	if code_length <= PAIR_CODE_LENGTH {
		return (ENCODING_BASE as f64).powi(2 - (code_length / 2) as i32);
	}

	(ENCODING_BASE as f64).powi(-3) / (GRID_ROWS as f64).powi((code_length - PAIR_CODE_LENGTH) as i32)
}

// Rounds to six decimals before truncating so that values sitting on a cell boundary do not slip
// into the cell below.
fn integer_place(degrees: f64, precision: i64) -> i64 {
	((degrees * precision as f64 * 1e6).round() / 1e6).floor() as i64
}
