pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Invalid plus code {code:?}: {message}")]
	InvalidGeoCode { code: String, message: String },
	#[error("Coordinate ({latitude}, {longitude}) is not a finite location.")]
	InvalidCoordinate { latitude: f64, longitude: f64 },
	#[error("Invalid plus code length {length}.")]
	InvalidCodeLength { length: usize },
	#[error("Filter {key} has no comparison modifier.")]
	MissingModifier { key: String },
	#[error("Filter {key} must be a string, number, or boolean.")]
	InvalidFilterValue { key: String },
	#[error("Sort token {token:?} must have the form <field>_<operator>.")]
	InvalidSortToken { token: String },
}
