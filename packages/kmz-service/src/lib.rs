pub mod session;

mod error;

pub use error::{Error, Result};
pub use kmz_domain::{PageMove, Paginate, SearchRequest, SearchResults, SearchState};
pub use kmz_providers::SearchReply;
pub use session::SearchSession;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use kmz_config::EndpointConfig;
use kmz_providers::{listing, search};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Submits composed queries to the remote search service.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a EndpointConfig,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchReply>>;
}

/// Turns a result hash into the full listing record.
pub trait RecordResolver
where
	Self: Send + Sync,
{
	fn resolve<'a>(
		&'a self,
		cfg: &'a EndpointConfig,
		hash: &'a str,
	) -> BoxFuture<'a, Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub search: Arc<dyn SearchBackend>,
	pub resolver: Arc<dyn RecordResolver>,
}
impl Providers {
	pub fn new(search: Arc<dyn SearchBackend>, resolver: Arc<dyn RecordResolver>) -> Self {
		Self { search, resolver }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(HttpProviders);

		Self { search: provider.clone(), resolver: provider }
	}
}

struct HttpProviders;
impl SearchBackend for HttpProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a EndpointConfig,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchReply>> {
		Box::pin(async move { Ok(search::submit(cfg, request).await?) })
	}
}
impl RecordResolver for HttpProviders {
	fn resolve<'a>(
		&'a self,
		cfg: &'a EndpointConfig,
		hash: &'a str,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			listing::retrieve(cfg, hash)
				.await
				.map_err(|err| Error::Resolution { hash: hash.to_string(), message: err.to_string() })
		})
	}
}
