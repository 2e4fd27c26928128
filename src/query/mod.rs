//! Query-string encoding for list requests.
//!
//! - [`Filter`]: `eq`/`gt`/`like`/`in`/`or` expressions in the API's grammar
//! - [`QueryParams`]: pagination, sort, includes, filter and total method
//! - [`build_url`]: appends the encoded parameters to a path

mod filter;
mod params;

pub use filter::{Filter, FilterValue};
pub use params::{build_url, QueryParams};
