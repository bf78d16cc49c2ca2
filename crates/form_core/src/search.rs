use crate::error::SearchError;

pub const SEARCH_ENDPOINT: &str = "https://www.geminiparts.co.za/search";
pub const MIN_QUERY_CHARS: usize = 2;

/// Destination for the header search box.
///
/// On `TooShort` the caller keeps the user on the page and focuses the input.
pub fn search_destination(query: &str) -> Result<String, SearchError> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(SearchError::TooShort {
            min: MIN_QUERY_CHARS,
        });
    }
    Ok(format!("{SEARCH_ENDPOINT}?q={}", urlencoding::encode(query)))
}
