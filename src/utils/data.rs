use crate::models::{format_price, Bookmaker, EventOdds, Market, OddsEvent, OddsRow};
use crate::utils::stats_merge::PlayerStatsTable;
use anyhow::{Context, Result};
use chrono::{NaiveDate, SecondsFormat, TimeZone};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Keep only the games that start on `date` in the given timezone
pub fn games_on_date<Tz: TimeZone>(
    events: &[OddsEvent],
    date: NaiveDate,
    tz: &Tz,
) -> Vec<OddsEvent> {
    events
        .iter()
        .filter(|event| event.commence_time.with_timezone(tz).date_naive() == date)
        .cloned()
        .collect()
}

/// Flatten a featured game into one row per bookmaker/market/outcome
pub fn odds_rows(event: &OddsEvent) -> Vec<OddsRow> {
    let commence_time = iso_time(event);
    flatten(
        &commence_time,
        &event.away_team,
        &event.home_team,
        event.bookmakers.iter(),
    )
}

/// Flatten a single-event response, filling missing game details from the
/// featured game it was requested for
pub fn event_odds_rows(odds: &EventOdds, game: &OddsEvent) -> Vec<OddsRow> {
    let commence_time = odds
        .commence_time
        .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_else(|| iso_time(game));
    let away_team = odds.away_team.as_deref().unwrap_or(&game.away_team);
    let home_team = odds.home_team.as_deref().unwrap_or(&game.home_team);

    flatten(&commence_time, away_team, home_team, odds.bookmakers.iter())
}

fn flatten<'a>(
    commence_time: &str,
    away_team: &str,
    home_team: &str,
    bookmakers: impl Iterator<Item = &'a Bookmaker>,
) -> Vec<OddsRow> {
    let mut rows = Vec::new();

    for book in bookmakers {
        for market in &book.markets {
            for outcome in &market.outcomes {
                rows.push(OddsRow {
                    commence_time: commence_time.to_string(),
                    away_team: away_team.to_string(),
                    home_team: home_team.to_string(),
                    bookmaker: book.display_name().to_string(),
                    market_key: market.key.clone(),
                    outcome_name: outcome.name.clone(),
                    price: format_price(outcome.price),
                });
            }
        }
    }

    rows
}

fn iso_time(event: &OddsEvent) -> String {
    event
        .commence_time
        .to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Console line for a game: start time, then `away @ home`
pub fn format_event(event: &OddsEvent) -> String {
    format!(
        "{} — {} @ {}",
        iso_time(event),
        event.away_team,
        event.home_team
    )
}

/// Console line for a market: `  [{key}] name price, name price`
pub fn format_market(market: &Market) -> String {
    let outcomes = market
        .outcomes
        .iter()
        .map(|o| format!("{} {}", o.name, format_price(o.price)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("  [{}] {}", market.key, outcomes)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory {}", parent.display())
            })?;
        }
    }
    Ok(())
}

/// Write the featured odds as pretty JSON, then append each per-event
/// document after a newline
pub fn write_odds_json(path: &Path, featured: &Value, extras: &[Value]) -> Result<()> {
    ensure_parent_dir(path)?;

    let json = serde_json::to_string_pretty(featured).context("Failed to serialize odds data")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write odds file {}", path.display()))?;

    if extras.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to reopen odds file {}", path.display()))?;
    for extra in extras {
        let json =
            serde_json::to_string_pretty(extra).context("Failed to serialize event odds")?;
        writeln!(file)?;
        file.write_all(json.as_bytes())?;
    }

    Ok(())
}

/// Save flattened odds rows to CSV
pub fn write_odds_csv(path: &Path, rows: &[OddsRow]) -> Result<()> {
    ensure_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    if rows.is_empty() {
        writer.write_record([
            "commence_time",
            "away_team",
            "home_team",
            "bookmaker",
            "market_key",
            "outcome_name",
            "price",
        ])?;
    }
    for row in rows {
        writer.serialize(row).context("Failed to write odds row")?;
    }

    writer.flush()?;
    Ok(())
}

/// Save the merged player stats table to CSV
pub fn write_player_stats_csv(path: &Path, table: &PlayerStatsTable) -> Result<()> {
    ensure_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(table.header())?;
    for player in &table.players {
        writer
            .write_record(table.record(player))
            .with_context(|| format!("Failed to write stats for player {}", player.player_id))?;
    }

    writer.flush()?;
    Ok(())
}
