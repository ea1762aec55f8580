//! Static export descriptors.
//!
//! Every exportable entity lists its columns at compile time as an ordered
//! slice of [`Field`]s. Exports read values only through these accessors,
//! so adding a column means adding one line to the entity's list.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::snapshot::{PlayerRow, RoundSnapshot};

/// One exported column: a name and how to read it.
pub struct Field<T: 'static> {
    pub name: &'static str,
    pub get: fn(&T) -> Value,
}

impl<T: 'static> Field<T> {
    #[must_use]
    pub const fn new(name: &'static str, get: fn(&T) -> Value) -> Self {
        Self { name, get }
    }

    /// Read this column from `entity`.
    #[must_use]
    pub fn value(&self, entity: &T) -> Value {
        (self.get)(entity)
    }
}

/// Where an entity shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPolicy {
    /// Included in the nested JSON export.
    pub in_json: bool,
    /// Included as columns of the live table.
    pub in_live_table: bool,
}

impl ExportPolicy {
    pub const EVERYWHERE: Self = Self {
        in_json: true,
        in_live_table: true,
    };
    pub const JSON_ONLY: Self = Self {
        in_json: true,
        in_live_table: false,
    };
}

/// An entity with a static column list.
pub trait Exportable: Sized + 'static {
    /// Entity name used in table headers, e.g. `"Player"`.
    const ENTITY: &'static str;
    const POLICY: ExportPolicy;

    fn fields() -> &'static [Field<Self>];

    /// The instance of this entity that belongs to one participant's row of
    /// the live table, if the entity is one-per-participant.
    fn for_participant<'a>(_round: &'a RoundSnapshot, _row: &'a PlayerRow) -> Option<&'a Self> {
        None
    }

    /// All columns as a JSON object, in field order.
    fn to_object(&self) -> serde_json::Map<String, Value> {
        Self::fields()
            .iter()
            .map(|f| (f.name.to_string(), f.value(self)))
            .collect()
    }
}

/// Money is exported as a string so no precision is lost.
pub(crate) fn decimal(value: Decimal) -> Value {
    Value::String(value.to_string())
}

pub(crate) fn text(value: impl std::fmt::Display) -> Value {
    Value::String(value.to_string())
}
