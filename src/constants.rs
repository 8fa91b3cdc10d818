pub mod discovery {

    pub const MIN_TERM_CHARS: usize = 2;

    pub const QUERY_SITE: &str = "linkedin.com/company";

    pub const COMPANY_URL_MARKER: &str = "linkedin.com/company/";

    pub const COMPANY_URL_PREFIX: &str = "https://www.linkedin.com/company/";

    pub const MAX_DESCRIPTION_CHARS: usize = 200;

    pub const UNKNOWN_COMPANY: &str = "Unknown Company";
}

pub mod scoring {

    pub const BASE: f64 = 0.6;

    pub const NAME_MATCH_BONUS: f64 = 0.25;

    pub const FIRST_RESULT_BONUS: f64 = 0.10;

    pub const SLUG_MATCH_BONUS: f64 = 0.05;

    pub const MAX_CONFIDENCE: f64 = 0.95;

    /// Scores at or above this are shown as confident matches.
    pub const DISPLAY_THRESHOLD: f64 = 0.7;
}

pub mod guess {

    pub const START_CONFIDENCE: f64 = 0.30;

    pub const CONFIDENCE_STEP: f64 = 0.05;

    pub const MIN_CONFIDENCE: f64 = 0.15;

    pub const MAX_GUESSES: usize = 2;
}

pub mod cache {

    pub const DISCOVERY_TTL_DAYS: u32 = 7;

    pub const MAX_TTL_DAYS: u32 = 3650;
}

pub mod limits {

    pub const MAX_RESULTS_PER_PROVIDER: usize = 3;

    pub const RATE_LIMIT_MAX_REQUESTS: u32 = 20;

    pub const RATE_LIMIT_WINDOW_SECONDS: u64 = 3600;

    pub const MAX_RATE_LIMIT_WINDOW_SECONDS: u64 = 31 * 24 * 3600;

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
}
