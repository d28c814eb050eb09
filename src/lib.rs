pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use api::*;
pub use models::*;
pub use utils::*;

use anyhow::{Context, Result};
use api::odds_api::{Fetched, OddsApiClient};
use api::stats_api::{StatGroup, StatsApiClient};
use chrono::{NaiveDate, TimeZone};
use serde_json::Value;
use tracing::{info, warn};
use utils::data::{event_odds_rows, games_on_date, odds_rows};
use utils::stats_merge::{merge_player_stats, PlayerStatsTable};

/// Everything pulled from the Odds API in one run
#[derive(Debug, Clone)]
pub struct OddsSnapshot {
    /// Featured endpoint response exactly as received (all upcoming games)
    pub featured_raw: Value,
    /// Games starting on the requested date
    pub todays_games: Vec<OddsEvent>,
    /// Extra markets for each of those games
    pub event_odds: Vec<(OddsEvent, Fetched<EventOdds>)>,
}

impl OddsSnapshot {
    /// Raw per-event documents, in fetch order
    pub fn event_documents(&self) -> Vec<Value> {
        self.event_odds
            .iter()
            .map(|(_, fetched)| fetched.raw.clone())
            .collect()
    }

    /// Featured rows for the day's games followed by their extra-market rows
    pub fn rows(&self) -> Vec<OddsRow> {
        let mut rows: Vec<OddsRow> = self.todays_games.iter().flat_map(odds_rows).collect();
        for (game, fetched) in &self.event_odds {
            rows.extend(event_odds_rows(&fetched.parsed, game));
        }
        rows
    }
}

/// Fetch featured odds, narrow them to games on `date`, then pull the extra
/// markets for each of those games
///
/// A failed per-event request is logged and skipped so one bad event does not
/// throw away the rest of the run.
pub async fn fetch_odds_snapshot<Tz: TimeZone>(
    client: &OddsApiClient,
    markets: &[String],
    extra_markets: &[String],
    date: NaiveDate,
    tz: &Tz,
) -> Result<OddsSnapshot> {
    let featured = client
        .fetch_featured_odds(markets)
        .await
        .context("Failed to fetch featured odds")?;
    info!("Fetched featured odds for {} games", featured.parsed.len());

    let todays_games = games_on_date(&featured.parsed, date, tz);
    info!("{} games on {}", todays_games.len(), date);

    let mut event_odds = Vec::new();
    if !extra_markets.is_empty() {
        for game in &todays_games {
            match client.fetch_event_odds(&game.id, extra_markets).await {
                Ok(fetched) => event_odds.push((game.clone(), fetched)),
                Err(e) => {
                    warn!(
                        "Failed to fetch extra markets for event {}: {:#}",
                        game.id,
                        anyhow::Error::from(e)
                    );
                    continue;
                }
            }
        }
    }

    Ok(OddsSnapshot {
        featured_raw: featured.raw,
        todays_games,
        event_odds,
    })
}

/// Fetch hitting and pitching stats for a season and join them per player
pub async fn fetch_season_player_stats(
    client: &StatsApiClient,
    season: i32,
) -> Result<PlayerStatsTable> {
    let hitting = client
        .fetch_group_stats(season, StatGroup::Hitting)
        .await
        .context("Failed to fetch hitting stats")?;
    let pitching = client
        .fetch_group_stats(season, StatGroup::Pitching)
        .await
        .context("Failed to fetch pitching stats")?;

    Ok(merge_player_stats(hitting, pitching))
}
