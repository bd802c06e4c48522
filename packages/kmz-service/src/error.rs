pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid plus code {code:?}: {message}")]
	InvalidGeoCode { code: String, message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Transport error: {message}")]
	Transport { status: Option<u16>, message: String },
	#[error("Resolution error for {hash}: {message}")]
	Resolution { hash: String, message: String },
}
impl From<kmz_domain::Error> for Error {
	fn from(err: kmz_domain::Error) -> Self {
		match err {
			kmz_domain::Error::InvalidGeoCode { code, message } =>
				Self::InvalidGeoCode { code, message },
			other => Self::InvalidRequest { message: other.to_string() },
		}
	}
}

impl From<kmz_providers::Error> for Error {
	fn from(err: kmz_providers::Error) -> Self {
		Self::Transport { status: err.status(), message: err.to_string() }
	}
}
