pub mod filter;
pub mod paginate;
pub mod plus_code;
pub mod request;
pub mod sort;
pub mod state;

mod error;

pub use error::{Error, Result};
pub use filter::{FilterInputs, PriceRange};
pub use paginate::{Direction, PageMove, Paginate};
pub use plus_code::{CodeArea, LatLng};
pub use request::{SearchRequest, SearchResponse};
pub use sort::SortSpec;
pub use state::{SearchResults, SearchState, Transform};
