//! Custom trades: definitions, the indexed catalog, per-villager ledgers,
//! random selection and the JSON loader.

mod catalog;
mod definition;
mod error;
mod ledger;
pub mod loader;
mod selector;

pub use catalog::TradeCatalog;
pub use definition::{
    AttributeModifier, DEFAULT_MAX_USES, ItemEnchantment, ModifierOperation, TradeDefinition,
    TradeId, TradeItem,
};
pub use error::{Axis, CatalogError, DefinitionError, LoadError, RecordError};
pub use ledger::{InstanceTradeLedger, MemoryLedger};
pub use loader::{LoadReport, RecordFailure, load_file, load_str, parse_record};
pub use selector::{bulk_reroll, pick_random_eligible, slot_level};
