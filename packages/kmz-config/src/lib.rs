mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, EndpointConfig, ReferenceLocation, Remote, Search, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		ParseFailure::Toml(source) => Error::ParseConfig { path: path.to_path_buf(), source },
		ParseFailure::Invalid(err) => err,
	})
}

pub fn from_toml_str(raw: &str) -> Result<Config> {
	parse(raw).map_err(|err| match err {
		ParseFailure::Toml(source) =>
			Error::Validation { message: format!("Config is not valid TOML: {source}") },
		ParseFailure::Invalid(err) => err,
	})
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, endpoint) in
		[("remote.search", &cfg.remote.search), ("remote.listing", &cfg.remote.listing)]
	{
		if endpoint.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("{label}.api_base must be non-empty."),
			});
		}
		if !endpoint.path.starts_with('/') {
			return Err(Error::Validation {
				message: format!("{label}.path must start with '/'."),
			});
		}
		if endpoint.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label}.timeout_ms must be greater than zero."),
			});
		}

		for (key, value) in &endpoint.default_headers {
			if !value.is_string() {
				return Err(Error::Validation {
					message: format!("{label}.default_headers.{key} must be a string."),
				});
			}
		}
	}

	if cfg.search.page_limit == 0 {
		return Err(Error::Validation {
			message: "search.page_limit must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.location_radius.is_finite() {
		return Err(Error::Validation {
			message: "search.location_radius must be a finite number.".to_string(),
		});
	}
	if !cfg.search.sort.contains('_') {
		return Err(Error::Validation {
			message: "search.sort must be a <field>_<operator> token.".to_string(),
		});
	}

	for (key, value) in &cfg.search.filters {
		if !(value.is_string() || value.is_number() || value.is_boolean()) {
			return Err(Error::Validation {
				message: format!("search.filters.{key} must be a string, number, or boolean."),
			});
		}
	}

	if let Some(reference) = cfg.search.reference_location {
		if !(-90.0..=90.0).contains(&reference.latitude) {
			return Err(Error::Validation {
				message: "search.reference_location.latitude must be in the range -90-90."
					.to_string(),
			});
		}
		if !(-180.0..=180.0).contains(&reference.longitude) {
			return Err(Error::Validation {
				message: "search.reference_location.longitude must be in the range -180-180."
					.to_string(),
			});
		}
	}

	Ok(())
}

enum ParseFailure {
	Toml(toml::de::Error),
	Invalid(Error),
}

fn parse(raw: &str) -> Result<Config, ParseFailure> {
	let mut cfg: Config = toml::from_str(raw).map_err(ParseFailure::Toml)?;

	normalize(&mut cfg);

	validate(&cfg).map_err(ParseFailure::Invalid)?;

	Ok(cfg)
}

fn normalize(cfg: &mut Config) {
	for endpoint in [&mut cfg.remote.search, &mut cfg.remote.listing] {
		let trimmed = endpoint.api_base.trim().trim_end_matches('/').to_string();

		endpoint.api_base = trimmed;
	}

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
