//! # fruitmarket-export
//!
//! Exports of a game session for analysis and admin views.
//!
//! Each exported entity declares its columns statically through
//! [`Exportable`]; an [`ExportRegistry`] built at startup lists the entities
//! and their order. Two exports read a [`SessionSnapshot`]:
//!
//! - [`export_session_json`]: nested tree of rounds and players, with offers
//!   under sellers and purchases under the buyer
//! - [`live_table`]: flat table with one row per participant

pub mod entities;
pub mod field;
pub mod json;
pub mod live;
pub mod registry;
pub mod snapshot;

pub use field::{ExportPolicy, Exportable, Field};
pub use json::export_session_json;
pub use live::{LiveRow, LiveTable, live_table};
pub use registry::{EntityDescriptor, ExportRegistry};
pub use snapshot::{PlayerRow, RoundSnapshot, SessionSnapshot};
