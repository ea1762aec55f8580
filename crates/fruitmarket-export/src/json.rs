//! Nested JSON export of a whole session.
//!
//! ```text
//! { "version", "rounds": [ { "round_number", "phase",
//!     "players": [ { <Player>, "balance": { <Balance> },
//!                    "fruitoffers": [..] | "purchases": [..] } ] } ] }
//! ```
//!
//! Sellers carry their offers, the buyer carries their purchases. Each
//! purchase names the offer it was made against.

use fruitmarket_types::constants::VERSION;
use fruitmarket_types::Role;
use serde_json::{Map, Value, json};

use crate::field::{Exportable, text};
use crate::snapshot::{PlayerRow, RoundSnapshot, SessionSnapshot};

/// Export every round of `snapshot` as one JSON document.
#[must_use]
pub fn export_session_json(snapshot: &SessionSnapshot) -> Value {
    let rounds: Vec<Value> = snapshot.rounds.iter().map(export_round).collect();
    json!({
        "version": VERSION,
        "rounds": rounds,
    })
}

fn export_round(round: &RoundSnapshot) -> Value {
    let mut players: Vec<&PlayerRow> = round.players.iter().collect();
    players.sort_by_key(|r| (r.player.id_in_group, r.player.id));

    let mut out = Map::new();
    out.insert("round_number".into(), Value::from(round.round.0));
    out.insert("phase".into(), text(round.phase));
    out.insert(
        "players".into(),
        players.into_iter().map(|row| export_player(round, row)).collect(),
    );
    Value::Object(out)
}

fn export_player(round: &RoundSnapshot, row: &PlayerRow) -> Value {
    let mut out = object_of(row);
    out.insert("balance".into(), Value::Object(object_of(&row.balance)));
    match row.player.role {
        Role::Seller => {
            out.insert("fruitoffers".into(), list(round.offers_by(row.player.id)));
        }
        Role::Buyer => {
            out.insert("purchases".into(), list(round.purchases_by(row.player.id)));
        }
    }
    Value::Object(out)
}

/// An entity's columns, or an empty object if it is not part of the JSON
/// export.
fn object_of<T: Exportable>(entity: &T) -> Map<String, Value> {
    if T::POLICY.in_json {
        entity.to_object()
    } else {
        Map::new()
    }
}

fn list<'a, T: Exportable>(items: impl Iterator<Item = &'a T>) -> Value {
    items
        .filter(|_| T::POLICY.in_json)
        .map(|i| Value::Object(i.to_object()))
        .collect()
}
