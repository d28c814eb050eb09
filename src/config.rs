use std::time::Duration;

pub const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
pub const STATS_API_BASE_URL: &str = "https://statsapi.mlb.com/api/v1";

pub const DEFAULT_SPORT_KEY: &str = "baseball_mlb";
pub const DEFAULT_REGIONS: &str = "us";
pub const DEFAULT_ODDS_FORMAT: &str = "american";
pub const DEFAULT_DATE_FORMAT: &str = "iso";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The only markets the bulk odds endpoint accepts for MLB
pub const FEATURED_MARKETS: [&str; 3] = ["h2h", "spreads", "totals"];

/// Markets asked of the featured endpoint; anything beyond the featured set
/// triggers the 422 fallback
pub const DEFAULT_MARKETS: &str = "h2h,spreads,totals,player_props";

/// Per-event markets fetched after the featured odds
pub const DEFAULT_EXTRA_MARKETS: &str =
    "batter_home_runs,batter_hits,pitcher_strikeouts,totals_1st_5_innings";

/// Page size used by the stats endpoint
pub const STATS_PAGE_SIZE: u32 = 100;

/// Settings for the Odds API client
#[derive(Debug, Clone)]
pub struct OddsApiSettings {
    pub api_key: String,
    pub base_url: String,
    pub sport_key: String,
    pub regions: String,
    pub odds_format: String,
    pub date_format: String,
    pub timeout: Duration,
}

impl OddsApiSettings {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: ODDS_API_BASE_URL.to_string(),
            sport_key: DEFAULT_SPORT_KEY.to_string(),
            regions: DEFAULT_REGIONS.to_string(),
            odds_format: DEFAULT_ODDS_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Settings for the MLB Stats API client
#[derive(Debug, Clone)]
pub struct StatsApiSettings {
    pub base_url: String,
    pub page_size: u32,
    pub timeout: Duration,
}

impl Default for StatsApiSettings {
    fn default() -> Self {
        Self {
            base_url: STATS_API_BASE_URL.to_string(),
            page_size: STATS_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Split a comma-separated market list, dropping blanks
pub fn parse_market_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
