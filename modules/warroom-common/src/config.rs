use std::env;

/// Minimum allowed poll interval. The feed rate-limits aggressively; polling
/// below this floor gets the session throttled.
pub const MIN_POLL_SECONDS: u64 = 15;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_path: String,

    // Feed identity
    pub scope: String,
    pub home_kingdom: Option<String>,

    // Feed endpoints
    pub base_url: String,
    pub news_path: String,
    pub kingdom_page_path: Option<String>,

    // Feed session
    pub session_id: String,
    pub session_cookie_name: String,

    // Ingest pacing
    pub ingest_enabled: bool,
    pub poll_seconds: u64,
    pub max_pages: u32,
    pub fetch_timeout_seconds: u64,
    pub cycle_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_path: env::var("WARROOM_DB_PATH").unwrap_or_else(|_| "warroom.db".to_string()),
            scope: required_env("WARROOM_SCOPE"),
            home_kingdom: env::var("WARROOM_HOME_KINGDOM").ok().filter(|v| !v.is_empty()),
            base_url: env::var("WARROOM_BASE_URL")
                .unwrap_or_else(|_| "https://utopia-game.com".to_string()),
            news_path: env::var("WARROOM_NEWS_PATH")
                .unwrap_or_else(|_| "/wol/game/kingdom_news".to_string()),
            kingdom_page_path: env::var("WARROOM_KINGDOM_PAGE_PATH")
                .ok()
                .filter(|v| !v.is_empty()),
            session_id: required_env("WARROOM_SESSION_ID"),
            session_cookie_name: env::var("WARROOM_SESSION_COOKIE")
                .unwrap_or_else(|_| "sessionid".to_string()),
            ingest_enabled: env::var("WARROOM_INGEST_ENABLED")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            poll_seconds: env::var("WARROOM_POLL_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<u64>()
                .expect("WARROOM_POLL_SECONDS must be a number")
                .max(MIN_POLL_SECONDS),
            max_pages: env::var("WARROOM_MAX_PAGES")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .expect("WARROOM_MAX_PAGES must be a number"),
            fetch_timeout_seconds: env::var("WARROOM_FETCH_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("WARROOM_FETCH_TIMEOUT_SECONDS must be a number"),
            cycle_timeout_seconds: env::var("WARROOM_CYCLE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("WARROOM_CYCLE_TIMEOUT_SECONDS must be a number"),
        }
    }

    /// Full URL of the paginated news feed.
    pub fn news_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.news_path)
    }

    /// Full URL of the kingdom overview page, when snapshot capture is on.
    pub fn kingdom_page_url(&self) -> Option<String> {
        self.kingdom_page_path
            .as_ref()
            .map(|path| format!("{}{}", self.base_url.trim_end_matches('/'), path))
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
