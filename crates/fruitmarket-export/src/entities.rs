//! Column lists of the exported entities.

use fruitmarket_types::{Offer, Purchase, RoundBalance};
use serde_json::Value;

use crate::field::{ExportPolicy, Exportable, Field, decimal, text};
use crate::snapshot::{PlayerRow, RoundSnapshot};

impl Exportable for PlayerRow {
    const ENTITY: &'static str = "Player";
    const POLICY: ExportPolicy = ExportPolicy::EVERYWHERE;

    fn fields() -> &'static [Field<Self>] {
        const FIELDS: &[Field<PlayerRow>] = &[
            Field::new("id_in_group", |r| Value::from(r.player.id_in_group)),
            Field::new("participant", |r| text(r.player.id.0)),
            Field::new("role", |r| text(r.player.role)),
            Field::new("phase", |r| text(r.phase)),
        ];
        FIELDS
    }

    fn for_participant<'a>(_round: &'a RoundSnapshot, row: &'a PlayerRow) -> Option<&'a Self> {
        Some(row)
    }
}

impl Exportable for RoundBalance {
    const ENTITY: &'static str = "Balance";
    const POLICY: ExportPolicy = ExportPolicy::EVERYWHERE;

    fn fields() -> &'static [Field<Self>] {
        const FIELDS: &[Field<RoundBalance>] = &[
            Field::new("starting", |b| decimal(b.starting)),
            Field::new("ending", |b| b.ending.map_or(Value::Null, decimal)),
            Field::new("delta", |b| decimal(b.delta())),
        ];
        FIELDS
    }

    fn for_participant<'a>(_round: &'a RoundSnapshot, row: &'a PlayerRow) -> Option<&'a Self> {
        Some(&row.balance)
    }
}

impl Exportable for Offer {
    const ENTITY: &'static str = "FruitOffer";
    const POLICY: ExportPolicy = ExportPolicy::JSON_ONLY;

    fn fields() -> &'static [Field<Self>] {
        const FIELDS: &[Field<Offer>] = &[
            Field::new("fruitoffer_id", |o| text(o.id.0)),
            Field::new("kind", |o| text(o.kind)),
            Field::new("is_organic", |o| Value::from(o.is_organic)),
            Field::new("price", |o| decimal(o.unit_price)),
            Field::new("amount", |o| Value::from(o.amount)),
            Field::new("original_amount", |o| Value::from(o.original_amount)),
        ];
        FIELDS
    }
}

impl Exportable for Purchase {
    const ENTITY: &'static str = "Purchase";
    const POLICY: ExportPolicy = ExportPolicy::JSON_ONLY;

    fn fields() -> &'static [Field<Self>] {
        const FIELDS: &[Field<Purchase>] = &[
            Field::new("purchase_id", |p| text(p.id.0)),
            Field::new("fruitoffer_id", |p| text(p.offer_id.0)),
            Field::new("amount", |p| Value::from(p.amount)),
            Field::new("price", |p| decimal(p.unit_price)),
            Field::new("cost", |p| decimal(p.cost)),
        ];
        FIELDS
    }
}
