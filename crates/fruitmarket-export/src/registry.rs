//! Explicit registry of exportable entities.
//!
//! Entities are registered once at startup, in the order their columns
//! should appear. Nothing is discovered at runtime.

use fruitmarket_types::{MarketError, Offer, Purchase, Result, RoundBalance};
use serde_json::Value;

use crate::field::{ExportPolicy, Exportable};
use crate::snapshot::{PlayerRow, RoundSnapshot};

/// Type-erased descriptor of one registered entity.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub policy: ExportPolicy,
    pub columns: Vec<&'static str>,
    row_values: fn(&RoundSnapshot, &PlayerRow) -> Vec<Value>,
}

impl EntityDescriptor {
    fn of<T: Exportable>() -> Self {
        Self {
            name: T::ENTITY,
            policy: T::POLICY,
            columns: T::fields().iter().map(|f| f.name).collect(),
            row_values: participant_values::<T>,
        }
    }

    /// This entity's live-table cells for one participant in one round.
    #[must_use]
    pub fn row_values(&self, round: &RoundSnapshot, row: &PlayerRow) -> Vec<Value> {
        (self.row_values)(round, row)
    }
}

fn participant_values<T: Exportable>(round: &RoundSnapshot, row: &PlayerRow) -> Vec<Value> {
    match T::for_participant(round, row) {
        Some(entity) => T::fields().iter().map(|f| f.value(entity)).collect(),
        None => vec![Value::Null; T::fields().len()],
    }
}

/// Registered entities in column order.
#[derive(Debug, Clone, Default)]
pub struct ExportRegistry {
    entities: Vec<EntityDescriptor>,
}

impl ExportRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every market entity: players, balances, offers and
    /// purchases.
    ///
    /// # Errors
    /// `Configuration` if two of the built-in entities share a name.
    pub fn standard() -> Result<Self> {
        let mut registry = Self::new();
        registry.register::<PlayerRow>()?;
        registry.register::<RoundBalance>()?;
        registry.register::<Offer>()?;
        registry.register::<Purchase>()?;
        Ok(registry)
    }

    /// Register an entity.
    ///
    /// # Errors
    /// `Configuration` if an entity with the same name is already registered.
    pub fn register<T: Exportable>(&mut self) -> Result<()> {
        if self.get(T::ENTITY).is_some() {
            return Err(MarketError::Configuration(format!(
                "export entity `{}` registered twice",
                T::ENTITY
            )));
        }
        self.entities.push(EntityDescriptor::of::<T>());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, entity: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.name == entity)
    }

    /// Column names of a registered entity.
    #[must_use]
    pub fn columns(&self, entity: &str) -> Option<&[&'static str]> {
        self.get(entity).map(|e| e.columns.as_slice())
    }

    /// Entities shown in the live table, in registration order.
    pub fn live_entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.iter().filter(|e| e.policy.in_live_table)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_lists_all_entities() {
        let registry = ExportRegistry::standard().unwrap();
        let names: Vec<_> = registry.iter().map(|e| e.name).collect();
        assert_eq!(names, ["Player", "Balance", "FruitOffer", "Purchase"]);
        assert_eq!(registry.columns("Balance"), Some(&["starting", "ending", "delta"][..]));
        assert!(registry.columns("Group").is_none());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = ExportRegistry::new();
        registry.register::<Offer>().unwrap();
        let err = registry.register::<Offer>().unwrap_err();
        assert!(matches!(err, MarketError::Configuration(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn live_entities_follow_policy() {
        let registry = ExportRegistry::standard().unwrap();
        let live: Vec<_> = registry.live_entities().map(|e| e.name).collect();
        assert_eq!(live, ["Player", "Balance"]);
    }
}
