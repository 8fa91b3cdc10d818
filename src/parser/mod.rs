pub mod linkedin;
pub mod query;

use regex::Regex;
use std::sync::OnceLock;

pub use linkedin::{Extracted, extract, is_company_url};
pub use query::build_query;

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}
