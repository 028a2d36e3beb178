//! Per-villager record of custom trades already granted
//!
//! The selector only needs membership checks, appends and clears; where the
//! record lives is up to the host. [`MemoryLedger`] keeps it in a map.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::TradeId;
use crate::villager::VillagerId;

/// Trade history keyed by villager instance
pub trait InstanceTradeLedger {
    /// Trades granted to this villager, oldest first
    fn granted(&self, villager: &VillagerId) -> &[TradeId];

    /// Record a newly granted trade
    fn append(&mut self, villager: &VillagerId, id: TradeId);

    /// Forget every trade granted to this villager
    fn clear(&mut self, villager: &VillagerId);

    fn contains(&self, villager: &VillagerId, id: &TradeId) -> bool {
        self.granted(villager).contains(id)
    }
}

/// In-memory ledger; entries are created on first append
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    entries: HashMap<VillagerId, Vec<TradeId>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of villagers with at least one recorded trade
    pub fn villager_count(&self) -> usize {
        self.entries.values().filter(|ids| !ids.is_empty()).count()
    }

    /// Iterate over every villager and its granted trades
    pub fn iter(&self) -> impl Iterator<Item = (&VillagerId, &[TradeId])> {
        self.entries.iter().map(|(v, ids)| (v, ids.as_slice()))
    }
}

impl InstanceTradeLedger for MemoryLedger {
    fn granted(&self, villager: &VillagerId) -> &[TradeId] {
        self.entries.get(villager).map(Vec::as_slice).unwrap_or(&[])
    }

    fn append(&mut self, villager: &VillagerId, id: TradeId) {
        self.entries.entry(villager.clone()).or_default().push(id);
    }

    fn clear(&mut self, villager: &VillagerId) {
        self.entries.remove(villager);
    }
}
