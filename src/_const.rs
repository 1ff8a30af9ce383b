use crate::url_state::{StarsFilter, StarsOperator};

pub const PAGE_SIZE: u32 = 20;

/// Compile-time override for the API host, e.g.
/// `ISSUES_API_URL=https://api.example.org dx build --release`.
pub fn api_base_url() -> &'static str {
    option_env!("ISSUES_API_URL").unwrap_or("http://localhost:8080")
}

pub const GITHUB_API_URL: &str = "https://api.github.com";

pub const DEFAULT_SORT_FIELD: &str = "ei.created_at";

/// (wire field, human label) pairs the sort picker offers.
pub const SORT_FIELDS: &[(&str, &str)] = &[
    ("er.stars", "Stars"),
    ("ei.created_at", "Issue created"),
    ("ei.updated_at", "Issue updated"),
    ("er.created_at", "Repository created"),
    ("er.updated_at", "Repository updated"),
];

pub const DEFAULT_STARS_FILTER: StarsFilter = StarsFilter {
    value: 10,
    operator: StarsOperator::Greater,
};

/// Stars value preselected when the user adds the filter by hand.
pub const ADDED_STARS_VALUE: u32 = 100;

pub const RANDOM_MAX_ATTEMPTS: u32 = 5;
pub const RANDOM_MAX_OFFSET: u32 = 100;

/// Fallback poll period for URL changes that fire no popstate event.
pub const URL_POLL_MS: u64 = 100;
/// How long the self-update flag stays up after a URL write, so the state
/// commits triggered by the write settle before external-change detection
/// resumes.
pub const SELF_UPDATE_CLEAR_MS: u32 = 50;

pub const SYNC_REFRESH_SECS: u64 = 5 * 60;
