use crate::config::{OddsApiSettings, FEATURED_MARKETS};
use crate::error::{redact_url, FetchError};
use crate::models::{ApiUsage, EventOdds, OddsEvent};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

/// A decoded response along with the untouched JSON it came from
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub raw: Value,
    pub parsed: T,
}

pub struct OddsApiClient {
    settings: OddsApiSettings,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(settings: OddsApiSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { settings, client })
    }

    /// Check how many API credits are left
    ///
    /// Makes a featured-markets odds request in decimal format and reads the
    /// quota headers off the response.
    pub async fn check_credits(&self) -> Result<ApiUsage, FetchError> {
        let url = format!(
            "{}/sports/{}/odds/",
            self.settings.base_url, self.settings.sport_key
        );
        let markets = FEATURED_MARKETS.join(",");
        let params = self.odds_params(&markets, "decimal");

        let request = self.client.get(&url).query(&params).build()?;
        let shown = redact_url(request.url());
        info!("Request URL: {}", shown);

        let response = self.client.execute(request).await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                url: shown,
            });
        }

        Ok(usage_from_headers(response.headers()))
    }

    /// Fetch upcoming games with odds from the featured endpoint
    ///
    /// The bulk endpoint rejects markets it does not support for the sport with
    /// a 422. In that case the request is retried once with only the featured
    /// markets.
    pub async fn fetch_featured_odds(
        &self,
        markets: &[String],
    ) -> Result<Fetched<Vec<OddsEvent>>, FetchError> {
        let url = format!(
            "{}/sports/{}/odds",
            self.settings.base_url, self.settings.sport_key
        );
        let params = self.odds_params(&markets.join(","), &self.settings.odds_format);

        let (raw, shown) = match self.get_raw(&url, &params).await {
            Err(e) if e.status() == Some(StatusCode::UNPROCESSABLE_ENTITY) => {
                warn!(
                    "Some markets unsupported for {}; retrying with featured markets only",
                    self.settings.sport_key
                );
                let featured = FEATURED_MARKETS.join(",");
                let params = self.odds_params(&featured, &self.settings.odds_format);
                self.get_raw(&url, &params).await?
            }
            other => other?,
        };

        let parsed =
            parse_events(&raw).map_err(|source| FetchError::Parse { url: shown, source })?;
        Ok(Fetched { raw, parsed })
    }

    /// Fetch the requested markets (props, innings, etc.) for a single event
    pub async fn fetch_event_odds(
        &self,
        event_id: &str,
        markets: &[String],
    ) -> Result<Fetched<EventOdds>, FetchError> {
        let url = format!(
            "{}/sports/{}/events/{}/odds",
            self.settings.base_url, self.settings.sport_key, event_id
        );
        let params = self.odds_params(&markets.join(","), &self.settings.odds_format);

        let (raw, shown) = self.get_raw(&url, &params).await?;
        let parsed = serde_json::from_value(raw.clone())
            .map_err(|source| FetchError::Parse { url: shown, source })?;
        Ok(Fetched { raw, parsed })
    }

    fn odds_params(&self, markets: &str, odds_format: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apiKey", self.settings.api_key.clone()),
            ("regions", self.settings.regions.clone()),
            ("markets", markets.to_string()),
            ("oddsFormat", odds_format.to_string()),
            ("dateFormat", self.settings.date_format.clone()),
        ]
    }

    /// GET and decode the body as untyped JSON; also returns the redacted URL
    async fn get_raw(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<(Value, String), FetchError> {
        let request = self.client.get(url).query(params).build()?;
        let shown = redact_url(request.url());
        debug!("GET {}", shown);

        let response = self.client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status, url: shown });
        }

        let usage = usage_from_headers(response.headers());
        if let Some(remaining) = &usage.remaining {
            debug!("Odds API requests remaining: {}", remaining);
        }

        let body = response.text().await?;
        let raw = serde_json::from_str(&body).map_err(|source| FetchError::Parse {
            url: shown.clone(),
            source,
        })?;

        Ok((raw, shown))
    }
}

/// Decode the featured games one by one; a game missing required fields is
/// skipped while the rest are kept
fn parse_events(raw: &Value) -> Result<Vec<OddsEvent>, serde_json::Error> {
    let items: Vec<Value> = serde_json::from_value(raw.clone())?;

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<OddsEvent>(item) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping malformed game in featured odds: {}", e);
                None
            }
        })
        .collect())
}

fn usage_from_headers(headers: &HeaderMap) -> ApiUsage {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    ApiUsage {
        remaining: read("x-requests-remaining"),
        used: read("x-requests-used"),
        last: read("x-requests-last"),
    }
}
