use crate::api::stats_api::{PlayerStatRow, StatGroup};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// A player after hitting and pitching lines have been joined
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPlayer {
    pub player_id: i64,
    pub player_name: Option<String>,
    pub stats: BTreeMap<String, Value>,
}

/// Joined hitting + pitching table, one row per player
#[derive(Debug, Clone)]
pub struct PlayerStatsTable {
    /// Stat columns: hitting ones first, then pitching, each sorted
    pub stat_columns: Vec<String>,
    /// Players ordered by id
    pub players: Vec<MergedPlayer>,
}

impl PlayerStatsTable {
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["playerId".to_string(), "playerName".to_string()];
        header.extend(self.stat_columns.iter().cloned());
        header
    }

    pub fn record(&self, player: &MergedPlayer) -> Vec<String> {
        let mut record = vec![
            player.player_id.to_string(),
            player.player_name.clone().unwrap_or_default(),
        ];
        record.extend(
            self.stat_columns
                .iter()
                .map(|col| player.stats.get(col).map(cell_value).unwrap_or_default()),
        );
        record
    }
}

/// Outer join hitting and pitching rows on player id
///
/// Pure hitters and pure pitchers both survive. The name comes from the
/// hitting side when present. A player repeated within one group keeps the
/// first row seen for that group.
pub fn merge_player_stats(
    hitting: Vec<PlayerStatRow>,
    pitching: Vec<PlayerStatRow>,
) -> PlayerStatsTable {
    let mut players: BTreeMap<i64, MergedPlayer> = BTreeMap::new();
    let hitting_columns = absorb(&mut players, hitting, StatGroup::Hitting);
    let pitching_columns = absorb(&mut players, pitching, StatGroup::Pitching);

    let mut stat_columns: Vec<String> = hitting_columns.into_iter().collect();
    stat_columns.extend(pitching_columns);

    PlayerStatsTable {
        stat_columns,
        players: players.into_values().collect(),
    }
}

fn absorb(
    players: &mut BTreeMap<i64, MergedPlayer>,
    rows: Vec<PlayerStatRow>,
    group: StatGroup,
) -> BTreeSet<String> {
    let mut columns = BTreeSet::new();
    let mut seen = HashSet::new();

    for row in rows {
        if !seen.insert(row.player_id) {
            debug!("Skipping repeated {} row for player {}", group, row.player_id);
            continue;
        }

        columns.extend(row.stats.keys().cloned());

        let player = players.entry(row.player_id).or_insert_with(|| MergedPlayer {
            player_id: row.player_id,
            player_name: None,
            stats: BTreeMap::new(),
        });
        if player.player_name.is_none() {
            player.player_name = row.player_name;
        }
        player.stats.extend(row.stats);
    }

    columns
}

fn cell_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: i64, name: Option<&str>, stats: &[(&str, Value)]) -> PlayerStatRow {
        PlayerStatRow {
            player_id: id,
            player_name: name.map(str::to_string),
            stats: stats
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_outer_join_keeps_every_player() {
        let hitting = vec![
            row(30, Some("Hitter Only"), &[("hitting_hits", json!(120))]),
            row(10, Some("Two Way"), &[("hitting_hits", json!(80))]),
        ];
        let pitching = vec![
            row(10, Some("Two Way"), &[("pitching_era", json!("3.10"))]),
            row(20, Some("Pitcher Only"), &[("pitching_era", json!("2.75"))]),
        ];

        let table = merge_player_stats(hitting, pitching);

        let ids: Vec<i64> = table.players.iter().map(|p| p.player_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);

        let two_way = &table.players[0];
        assert_eq!(two_way.stats.len(), 2);

        let pitcher = &table.players[1];
        assert_eq!(pitcher.player_name.as_deref(), Some("Pitcher Only"));
        assert_eq!(table.record(pitcher), vec!["20", "Pitcher Only", "", "2.75"]);
    }

    #[test]
    fn test_column_order() {
        let hitting = vec![row(
            1,
            Some("A"),
            &[("hitting_runs", json!(5)), ("hitting_avg", json!(".300"))],
        )];
        let pitching = vec![row(
            1,
            Some("A"),
            &[("pitching_wins", json!(2)), ("pitching_era", json!("1.00"))],
        )];

        let table = merge_player_stats(hitting, pitching);
        assert_eq!(
            table.header(),
            vec![
                "playerId",
                "playerName",
                "hitting_avg",
                "hitting_runs",
                "pitching_era",
                "pitching_wins"
            ]
        );
        assert_eq!(
            table.record(&table.players[0]),
            vec!["1", "A", ".300", "5", "1.00", "2"]
        );
    }

    #[test]
    fn test_name_prefers_hitting_then_falls_back() {
        let hitting = vec![
            row(1, Some("Hitting Name"), &[]),
            row(2, None, &[]),
        ];
        let pitching = vec![
            row(1, Some("Pitching Name"), &[]),
            row(2, Some("From Pitching"), &[]),
        ];

        let table = merge_player_stats(hitting, pitching);
        assert_eq!(table.players[0].player_name.as_deref(), Some("Hitting Name"));
        assert_eq!(table.players[1].player_name.as_deref(), Some("From Pitching"));
    }

    #[test]
    fn test_repeated_player_keeps_first_row() {
        let hitting = vec![
            row(1, Some("A"), &[("hitting_hits", json!(10))]),
            row(1, Some("A"), &[("hitting_hits", json!(99))]),
        ];

        let table = merge_player_stats(hitting, vec![]);
        assert_eq!(table.players.len(), 1);
        assert_eq!(table.players[0].stats["hitting_hits"], json!(10));
    }

    #[test]
    fn test_empty_inputs() {
        let table = merge_player_stats(vec![], vec![]);
        assert!(table.players.is_empty());
        assert_eq!(table.header(), vec!["playerId", "playerName"]);
    }
}
