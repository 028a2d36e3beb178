//! Custom villager trades
//!
//! A catalog of trade definitions indexed by profession, villager type and
//! level, a per-villager ledger of granted trades, and the random selection
//! that ties them together. The host game calls the hooks in [`events`]
//! (or their [`TradeService`] wrappers) and applies the outcomes.

pub mod events;
pub mod options;
pub mod service;
pub mod trade;
pub mod villager;

mod rng;

pub use events::{AcquireOutcome, Merchant, RerollError, VanillaOffer};
pub use options::{OptionsError, TradeOptions};
pub use rng::{RandomSource, TradeRng};
pub use service::TradeService;
pub use trade::{
    bulk_reroll, pick_random_eligible, slot_level, Axis, CatalogError, DefinitionError,
    InstanceTradeLedger, LoadError, LoadReport, MemoryLedger, RecordError, RecordFailure,
    TradeCatalog, TradeDefinition, TradeId, TradeItem,
};
pub use villager::{Level, MerchantKind, Profession, VillagerId, VillagerType, LEVELS};
