//! Domain models with validation

mod search;
mod validation;

pub use search::{SearchQuery, MAX_QUERY_LEN};
pub use validation::ValidationError;
