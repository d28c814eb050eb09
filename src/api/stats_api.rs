use crate::config::StatsApiSettings;
use crate::error::{redact_url, FetchError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Stat group requested from the stats endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatGroup {
    Hitting,
    Pitching,
}

impl StatGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatGroup::Hitting => "hitting",
            StatGroup::Pitching => "pitching",
        }
    }

    /// Prefix put in front of every metric so both groups can share a table
    pub fn column_prefix(&self) -> String {
        format!("{}_", self.as_str())
    }
}

impl fmt::Display for StatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One player's season line for a single stat group
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatRow {
    pub player_id: i64,
    pub player_name: Option<String>,
    /// Metric values keyed by prefixed column name (e.g. `hitting_avg`)
    pub stats: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    stats: Vec<StatBlock>,
}

#[derive(Debug, Deserialize)]
struct StatBlock {
    #[serde(default)]
    splits: Vec<StatSplit>,
}

#[derive(Debug, Deserialize)]
struct StatSplit {
    #[serde(default)]
    stat: Map<String, Value>,
    player: SplitPlayer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitPlayer {
    id: i64,
    #[serde(default)]
    full_name: Option<String>,
}

pub struct StatsApiClient {
    settings: StatsApiSettings,
    client: reqwest::Client,
}

impl StatsApiClient {
    pub fn new(settings: StatsApiSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { settings, client })
    }

    /// Fetch every player's season stats for one group, following pagination
    /// until the endpoint hands back a page with no records
    pub async fn fetch_group_stats(
        &self,
        season: i32,
        group: StatGroup,
    ) -> Result<Vec<PlayerStatRow>, FetchError> {
        // A zero page size would never advance the offset
        let limit = self.settings.page_size.max(1);
        let mut offset: u32 = 0;
        let mut all_rows = Vec::new();

        loop {
            let page = self.fetch_page(season, group, limit, offset).await?;

            if page.stats.is_empty() || page.stats.iter().all(|b| b.splits.is_empty()) {
                break;
            }

            let batch = rows_from_page(page, group);
            if batch.is_empty() {
                break;
            }

            debug!(
                "Fetched {} {} rows at offset {}",
                batch.len(),
                group,
                offset
            );
            all_rows.extend(batch);
            offset += limit;
        }

        info!("Retrieved {} stats for {} players", group, all_rows.len());
        Ok(all_rows)
    }

    async fn fetch_page(
        &self,
        season: i32,
        group: StatGroup,
        limit: u32,
        offset: u32,
    ) -> Result<StatsResponse, FetchError> {
        let url = format!("{}/stats", self.settings.base_url);
        let params = [
            ("stats", "season".to_string()),
            ("season", season.to_string()),
            ("group", group.as_str().to_string()),
            ("playerPool", "ALL".to_string()),
            ("hydrate", "person([id,name])".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];

        let request = self.client.get(&url).query(&params).build()?;
        let shown = redact_url(request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status, url: shown });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Parse { url: shown, source })
    }
}

fn rows_from_page(page: StatsResponse, group: StatGroup) -> Vec<PlayerStatRow> {
    let prefix = group.column_prefix();

    page.stats
        .into_iter()
        .flat_map(|block| block.splits)
        .map(|split| PlayerStatRow {
            player_id: split.player.id,
            player_name: split.player.full_name,
            stats: split
                .stat
                .into_iter()
                .map(|(field, value)| (format!("{}{}", prefix, field), value))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn mock_settings(server: &MockServer) -> StatsApiSettings {
        StatsApiSettings {
            base_url: server.uri(),
            page_size: 2,
            ..StatsApiSettings::default()
        }
    }

    fn split(id: i64, name: &str, stat: Value) -> Value {
        json!({
            "season": "2025",
            "stat": stat,
            "player": {"id": id, "fullName": name, "link": format!("/api/v1/people/{}", id)}
        })
    }

    #[test]
    fn test_rows_from_page_prefixes_metrics() {
        let page: StatsResponse = serde_json::from_value(json!({
            "stats": [{
                "splits": [split(592450, "Aaron Judge", json!({"homeRuns": 20, "avg": ".331"}))]
            }]
        }))
        .unwrap();

        let rows = rows_from_page(page, StatGroup::Hitting);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_id, 592450);
        assert_eq!(rows[0].player_name.as_deref(), Some("Aaron Judge"));
        assert_eq!(rows[0].stats["hitting_homeRuns"], json!(20));
        assert_eq!(rows[0].stats["hitting_avg"], json!(".331"));
    }

    #[tokio::test]
    async fn test_fetch_group_stats_paginates_until_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("group", "pitching"))
            .and(query_param("season", "2025"))
            .and(query_param("playerPool", "ALL"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stats": [{"splits": [
                    split(1, "Pitcher One", json!({"era": "2.10"})),
                    split(2, "Pitcher Two", json!({"era": "3.40"}))
                ]}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stats": [{"splits": [split(3, "Pitcher Three", json!({"era": "4.05"}))]}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("offset", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stats": [{"splits": []}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = StatsApiClient::new(mock_settings(&server)).unwrap();
        let rows = client
            .fetch_group_stats(2025, StatGroup::Pitching)
            .await
            .unwrap();

        let ids: Vec<i64> = rows.iter().map(|r| r.player_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(rows[2].stats["pitching_era"], json!("4.05"));
    }

    #[tokio::test]
    async fn test_fetch_group_stats_zero_page_size_still_advances() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("limit", "1"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stats": [{"splits": [split(1, "Only Player", json!({"hits": 3}))]}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("offset", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stats": []})))
            .expect(1)
            .mount(&server)
            .await;

        let settings = StatsApiSettings {
            page_size: 0,
            ..mock_settings(&server)
        };
        let client = StatsApiClient::new(settings).unwrap();
        let rows = client
            .fetch_group_stats(2025, StatGroup::Hitting)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_group_stats_stops_on_missing_stats() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"copyright": "MLB"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = StatsApiClient::new(mock_settings(&server)).unwrap();
        let rows = client
            .fetch_group_stats(2025, StatGroup::Hitting)
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_group_stats_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = StatsApiClient::new(mock_settings(&server)).unwrap();
        let err = client
            .fetch_group_stats(2025, StatGroup::Hitting)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_group_stats_live() {
        let client = StatsApiClient::new(StatsApiSettings::default()).unwrap();
        let rows = client
            .fetch_group_stats(2024, StatGroup::Hitting)
            .await
            .unwrap();
        assert!(!rows.is_empty());
    }
}
