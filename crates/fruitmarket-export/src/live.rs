//! Live table: one row per participant, one column group per round.
//!
//! Column headers read `"Round {n}.{Entity}.{field}"`. Only entities whose
//! policy has `in_live_table` contribute columns. Rows are labelled `P1`,
//! `P2`, ... in participant order.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::registry::ExportRegistry;
use crate::snapshot::SessionSnapshot;

/// A participant's row.
#[derive(Debug, Clone, Serialize)]
pub struct LiveRow {
    pub participant_label: String,
    /// One cell per header.
    pub values: Vec<Value>,
}

/// Admin-style table over all rounds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LiveTable {
    pub headers: Vec<String>,
    pub rows: Vec<LiveRow>,
}

impl LiveTable {
    /// Rows as objects keyed by header, each starting with
    /// `participant_label`.
    #[must_use]
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                record.insert(
                    "participant_label".into(),
                    Value::String(row.participant_label.clone()),
                );
                for (header, value) in self.headers.iter().zip(&row.values) {
                    record.insert(header.clone(), value.clone());
                }
                record
            })
            .collect()
    }
}

/// Build the live table of `snapshot` from the live entities of `registry`.
///
/// A participant missing from a round gets `null` cells for that round.
#[must_use]
pub fn live_table(snapshot: &SessionSnapshot, registry: &ExportRegistry) -> LiveTable {
    let mut table = LiveTable::default();
    let participants = snapshot.participants();
    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); participants.len()];

    for round in &snapshot.rounds {
        for entity in registry.live_entities() {
            table.headers.extend(
                entity
                    .columns
                    .iter()
                    .map(|col| format!("Round {}.{}.{col}", round.round.0, entity.name)),
            );
            for (participant, row_cells) in participants.iter().zip(cells.iter_mut()) {
                match round.row(*participant) {
                    Some(row) => row_cells.extend(entity.row_values(round, row)),
                    None => row_cells.extend(entity.columns.iter().map(|_| Value::Null)),
                }
            }
        }
    }

    table.rows = cells
        .into_iter()
        .enumerate()
        .map(|(i, values)| LiveRow {
            participant_label: format!("P{}", i + 1),
            values,
        })
        .collect();
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{PlayerRow, RoundSnapshot};
    use fruitmarket_types::*;
    use rust_decimal::Decimal;

    fn row(player: &Player, starting: i64, ending: Option<i64>) -> PlayerRow {
        PlayerRow {
            player: player.clone(),
            phase: PlayerPhase::initial(player.role),
            balance: RoundBalance {
                starting: Decimal::new(starting, 0),
                ending: ending.map(|e| Decimal::new(e, 0)),
            },
        }
    }

    fn two_rounds() -> SessionSnapshot {
        let buyer = Player::new(PlayerId::new(), 1, RoundNumber(1), 1);
        let seller = Player::new(PlayerId::new(), 2, RoundNumber(1), 1);
        let round = |n: u32, rows: Vec<PlayerRow>| RoundSnapshot {
            round: RoundNumber(n),
            phase: RoundPhase::Offers,
            players: rows,
            offers: vec![],
            purchases: vec![],
        };
        SessionSnapshot {
            rounds: vec![
                round(1, vec![row(&buyer, 10, Some(2)), row(&seller, 5, Some(13))]),
                round(2, vec![row(&buyer, 2, None), row(&seller, 13, None)]),
            ],
        }
    }

    #[test]
    fn headers_name_round_entity_and_field() {
        let registry = ExportRegistry::standard().unwrap();
        let table = live_table(&two_rounds(), &registry);
        // 4 player columns + 3 balance columns per round.
        assert_eq!(table.headers.len(), 14);
        assert_eq!(table.headers[0], "Round 1.Player.id_in_group");
        assert_eq!(table.headers[4], "Round 1.Balance.starting");
        assert_eq!(table.headers[7], "Round 2.Player.id_in_group");
        assert!(!table.headers.iter().any(|h| h.contains("FruitOffer")));
    }

    #[test]
    fn one_row_per_participant() {
        let registry = ExportRegistry::standard().unwrap();
        let table = live_table(&two_rounds(), &registry);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].participant_label, "P1");
        assert_eq!(table.rows[1].participant_label, "P2");
        assert!(table.rows.iter().all(|r| r.values.len() == table.headers.len()));

        let records = table.to_records();
        assert_eq!(records[0]["participant_label"], "P1");
        assert_eq!(records[0]["Round 1.Player.role"], "buyer");
        assert_eq!(records[0]["Round 1.Balance.ending"], "2");
        assert_eq!(records[1]["Round 2.Balance.starting"], "13");
        assert_eq!(records[1]["Round 2.Balance.ending"], Value::Null);
    }

    #[test]
    fn empty_registry_gives_label_only_rows() {
        let table = live_table(&two_rounds(), &ExportRegistry::new());
        assert!(table.headers.is_empty());
        assert_eq!(table.rows.len(), 2);
    }
}
