//! Validated search query

use super::ValidationError;

/// Longest accepted query, in characters.
pub const MAX_QUERY_LEN: usize = 256;

/// A non-empty substring to search product names for.
///
/// Whitespace is a valid query; only the empty string is rejected.
///
/// Holds the raw client text. It is only ever handed to the database as a
/// bound parameter via [`SearchQuery::like_pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: "query" });
        }
        if raw.chars().count() > MAX_QUERY_LEN {
            return Err(ValidationError::TooLong {
                field: "query",
                max: MAX_QUERY_LEN,
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parameter value for `name LIKE ?`: the query wrapped in `%`.
    pub fn like_pattern(&self) -> String {
        format!("%{}%", self.0)
    }
}
