use crate::constants::discovery::QUERY_SITE;

/// Scopes a company name to LinkedIn company pages.
///
/// Only trims; length checks belong to the caller.
#[must_use]
pub fn build_query(company_name: &str) -> String {
    format!("site:{QUERY_SITE} {}", company_name.trim())
}
