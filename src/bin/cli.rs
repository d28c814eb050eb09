use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use mlb_odds_fetch::config::{
    parse_market_list, OddsApiSettings, StatsApiSettings, DEFAULT_EXTRA_MARKETS, DEFAULT_MARKETS,
    DEFAULT_ODDS_FORMAT, DEFAULT_REGIONS, DEFAULT_SPORT_KEY, DEFAULT_TIMEOUT_SECS,
};
use mlb_odds_fetch::data::{
    format_event, format_market, write_odds_csv, write_odds_json, write_player_stats_csv,
};
use mlb_odds_fetch::odds_api::OddsApiClient;
use mlb_odds_fetch::stats_api::StatsApiClient;
use mlb_odds_fetch::{fetch_odds_snapshot, fetch_season_player_stats, OddsSnapshot};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Pull MLB odds and player stats and save them to local files
#[derive(Debug, Parser)]
#[command(name = "mlb_odds_fetch", version, about)]
struct Cli {
    /// Directory for output files when --output is not given
    #[arg(long, env = "MLB_FETCH_OUTPUT_DIR", default_value = "output", global = true)]
    output_dir: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, env = "MLB_FETCH_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check the Odds API key and print remaining credits
    Credits {
        #[command(flatten)]
        odds: OddsArgs,
    },
    /// Save featured odds (plus per-event markets) as JSON
    OddsJson {
        #[command(flatten)]
        odds: OddsArgs,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Output file (default: <output-dir>/odds.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Save the day's odds as CSV rows
    OddsCsv {
        #[command(flatten)]
        odds: OddsArgs,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Output file (default: <output-dir>/odds.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Save season hitting + pitching stats for every player as CSV
    Stats {
        /// Season year (default: current year)
        #[arg(long)]
        season: Option<i32>,
        /// Output file (default: <output-dir>/player_stats.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct OddsArgs {
    /// The Odds API key
    #[arg(long, env = "ODDS_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, default_value = DEFAULT_SPORT_KEY)]
    sport: String,

    #[arg(long, default_value = DEFAULT_REGIONS)]
    regions: String,

    /// american or decimal
    #[arg(long, default_value = DEFAULT_ODDS_FORMAT)]
    odds_format: String,
}

#[derive(Debug, Args)]
struct SelectionArgs {
    /// Markets requested from the featured endpoint
    #[arg(long, default_value = DEFAULT_MARKETS)]
    markets: String,

    /// Markets fetched per game on the selected date
    #[arg(long, default_value = DEFAULT_EXTRA_MARKETS)]
    extra_markets: String,

    /// Skip the per-event requests
    #[arg(long)]
    no_event_markets: bool,

    /// Game date in YYYY-MM-DD (default: today, local time)
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl OddsArgs {
    fn client(&self, timeout: Duration) -> Result<OddsApiClient> {
        let mut settings = OddsApiSettings::new(self.api_key.clone());
        settings.sport_key = self.sport.clone();
        settings.regions = self.regions.clone();
        settings.odds_format = self.odds_format.clone();
        settings.timeout = timeout;
        OddsApiClient::new(settings).context("Failed to build Odds API client")
    }
}

impl SelectionArgs {
    async fn snapshot(&self, client: &OddsApiClient) -> Result<OddsSnapshot> {
        let markets = parse_market_list(&self.markets);
        let extra_markets = if self.no_event_markets {
            Vec::new()
        } else {
            parse_market_list(&self.extra_markets)
        };
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());

        fetch_odds_snapshot(client, &markets, &extra_markets, date, &Local).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);

    match cli.command {
        Command::Credits { odds } => {
            let client = odds.client(timeout)?;
            let usage = client
                .check_credits()
                .await
                .context("Credit check failed")?;

            println!(
                "Remaining credits: {}",
                usage.remaining.as_deref().unwrap_or("unknown")
            );
            if let Some(used) = usage.used {
                println!("Used credits: {}", used);
            }
            if let Some(last) = usage.last {
                println!("Cost of this request: {}", last);
            }
        }
        Command::OddsJson {
            odds,
            selection,
            output,
        } => {
            let client = odds.client(timeout)?;
            let snapshot = selection.snapshot(&client).await?;
            let path = output.unwrap_or_else(|| cli.output_dir.join("odds.json"));

            write_odds_json(&path, &snapshot.featured_raw, &snapshot.event_documents())?;
            println!("Saved featured odds to {}\n", path.display());

            print_snapshot(&snapshot);
        }
        Command::OddsCsv {
            odds,
            selection,
            output,
        } => {
            let client = odds.client(timeout)?;
            let snapshot = selection.snapshot(&client).await?;
            let path = output.unwrap_or_else(|| cli.output_dir.join("odds.csv"));

            let rows = snapshot.rows();
            write_odds_csv(&path, &rows)?;
            println!("Exported {} odds rows to CSV: {}", rows.len(), path.display());
        }
        Command::Stats { season, output } => {
            let season = season.unwrap_or_else(|| Local::now().year());
            let path = output.unwrap_or_else(|| cli.output_dir.join("player_stats.csv"));
            let settings = StatsApiSettings {
                timeout,
                ..StatsApiSettings::default()
            };
            let client =
                StatsApiClient::new(settings).context("Failed to build Stats API client")?;

            println!("Fetching all hitting and pitching stats for {}...", season);
            let table = fetch_season_player_stats(&client, season).await?;

            write_player_stats_csv(&path, &table)?;
            println!(
                "\nWrote {} rows (one per player) to:\n  {}",
                table.players.len(),
                path.display()
            );
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &OddsSnapshot) {
    for game in &snapshot.todays_games {
        println!("{}", format_event(game));
        for book in &game.bookmakers {
            for market in &book.markets {
                println!("{}", format_market(market));
            }
        }
    }

    for (game, fetched) in &snapshot.event_odds {
        println!("--- Additional markets for event {} ---", game.id);
        for book in &fetched.parsed.bookmakers {
            for market in &book.markets {
                println!("{}", format_market(market));
            }
        }
    }
}
