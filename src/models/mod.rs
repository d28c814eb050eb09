use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An upcoming game as returned by the featured odds endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsEvent {
    pub id: String,
    #[serde(default)]
    pub sport_key: Option<String>,
    #[serde(default)]
    pub sport_title: Option<String>,
    pub commence_time: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

/// Response from the single-event odds endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOdds {
    pub id: String,
    #[serde(default)]
    pub commence_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

/// Sportsbook and the markets it offers for one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markets: Vec<Market>,
}

impl Bookmaker {
    /// Title when the API sends one, otherwise the bookmaker key
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.key)
    }
}

/// Market (e.g., h2h, spreads, batter_hits) offered by a bookmaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub key: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

/// A single priced outcome inside a market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One flattened line of the odds CSV export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsRow {
    pub commence_time: String,
    pub away_team: String,
    pub home_team: String,
    pub bookmaker: String,
    pub market_key: String,
    pub outcome_name: String,
    pub price: String,
}

/// Request quota reported by the Odds API response headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUsage {
    pub remaining: Option<String>,
    pub used: Option<String>,
    pub last: Option<String>,
}

/// Render a price the way the API sent it: `-110` stays `-110`, `1.91` stays `1.91`
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{}", price as i64)
    } else {
        format!("{}", price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(-110.0), "-110");
        assert_eq!(format_price(150.0), "150");
        assert_eq!(format_price(1.91), "1.91");
        assert_eq!(format_price(2.5), "2.5");
    }

    #[test]
    fn test_bookmaker_display_name() {
        let mut book = Bookmaker {
            key: "draftkings".to_string(),
            title: Some("DraftKings".to_string()),
            last_update: None,
            markets: vec![],
        };
        assert_eq!(book.display_name(), "DraftKings");

        book.title = None;
        assert_eq!(book.display_name(), "draftkings");
    }

    #[test]
    fn test_deserialize_event() {
        let json = r#"{
            "id": "abc123",
            "sport_key": "baseball_mlb",
            "sport_title": "MLB",
            "commence_time": "2025-06-01T23:05:00Z",
            "home_team": "New York Yankees",
            "away_team": "Boston Red Sox",
            "bookmakers": [{
                "key": "fanduel",
                "title": "FanDuel",
                "last_update": "2025-06-01T18:00:00Z",
                "markets": [{
                    "key": "totals",
                    "outcomes": [
                        {"name": "Over", "price": -115, "point": 8.5},
                        {"name": "Under", "price": -105, "point": 8.5}
                    ]
                }]
            }]
        }"#;

        let event: OddsEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.home_team, "New York Yankees");
        assert_eq!(event.bookmakers[0].markets[0].outcomes[0].price, -115.0);
        assert_eq!(event.bookmakers[0].markets[0].outcomes[1].point, Some(8.5));
    }

    #[test]
    fn test_deserialize_event_odds_without_teams() {
        let json = r#"{"id": "abc123", "bookmakers": []}"#;
        let odds: EventOdds = serde_json::from_str(json).unwrap();
        assert!(odds.home_team.is_none());
        assert!(odds.commence_time.is_none());
    }
}
