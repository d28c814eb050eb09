pub mod odds_api;
pub mod stats_api;

pub use odds_api::{Fetched, OddsApiClient};
pub use stats_api::{PlayerStatRow, StatGroup, StatsApiClient};
