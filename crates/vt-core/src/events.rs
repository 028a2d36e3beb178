//! Hooks the host game calls when merchant state changes
//!
//! Each hook takes the catalog snapshot and the ledger explicitly; the host
//! applies the returned outcome to its own entities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::TradeOptions;
use crate::rng::RandomSource;
use crate::trade::{
    bulk_reroll, pick_random_eligible, InstanceTradeLedger, TradeCatalog, TradeDefinition,
    TradeId,
};
use crate::villager::{Level, MerchantKind, Profession, VillagerId, VillagerType};

/// Merchant state as seen by the trade hooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: VillagerId,
    pub kind: MerchantKind,
    pub profession: Profession,
    pub villager_type: VillagerType,
    pub level: Level,
    /// Number of offers the merchant currently holds
    pub offer_count: usize,
}

impl Merchant {
    /// A villager with no offers yet
    pub fn villager(
        id: impl Into<VillagerId>,
        profession: Profession,
        villager_type: VillagerType,
        level: Level,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MerchantKind::Villager,
            profession,
            villager_type,
            level,
            offer_count: 0,
        }
    }
}

/// The offer the game generated on its own
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanillaOffer {
    /// The offer sells a filled explorer map
    pub result_is_filled_map: bool,
}

/// What to do with an offer the game is about to add
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcquireOutcome<'c> {
    /// Leave the game's own offer in place
    KeepVanilla,
    /// Swap the offer for this custom trade; already recorded in the ledger
    Replace(&'c TradeDefinition),
    /// Drop the offer, nothing is available
    Cancel,
}

/// Why a manual reroll was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RerollError {
    #[error("entity {0} is not a villager")]
    NotAVillager(VillagerId),

    #[error("villager {0} has no trades to reroll")]
    NoTrades(VillagerId),
}

/// Decide what replaces a newly acquired vanilla offer
pub fn acquire_trade<'c, L, R>(
    catalog: &'c TradeCatalog,
    ledger: &mut L,
    options: &TradeOptions,
    merchant: &Merchant,
    offer: VanillaOffer,
    rng: &mut R,
) -> AcquireOutcome<'c>
where
    L: InstanceTradeLedger + ?Sized,
    R: RandomSource + ?Sized,
{
    if !options.custom_trades || merchant.kind == MerchantKind::WanderingTrader {
        return AcquireOutcome::KeepVanilla;
    }
    if offer.result_is_filled_map && options.vanilla_cartographer_maps {
        return AcquireOutcome::KeepVanilla;
    }

    match pick_random_eligible(
        catalog,
        &*ledger,
        &merchant.id,
        merchant.profession,
        merchant.villager_type,
        merchant.level,
        rng,
    ) {
        Some(trade) => {
            ledger.append(&merchant.id, trade.id().clone());
            AcquireOutcome::Replace(trade)
        }
        None => {
            tracing::debug!(villager = %merchant.id, "No custom trade available, cancelling offer");
            AcquireOutcome::Cancel
        }
    }
}

/// Clear the ledger when a villager loses the ability to trade
///
/// Returns whether the ledger was cleared.
pub fn profession_changed<L>(ledger: &mut L, villager: &VillagerId, profession: Profession) -> bool
where
    L: InstanceTradeLedger + ?Sized,
{
    if profession.can_trade() {
        return false;
    }
    ledger.clear(villager);
    tracing::debug!(villager = %villager, %profession, "Cleared trade ledger");
    true
}

/// Carry granted trades over to the entity a villager turned into
///
/// The target's list is replaced by the source's, even an empty one, so a
/// reused entity id never keeps a stale history. Returns whether any trade
/// was carried over.
pub fn transform<L>(ledger: &mut L, from: &VillagerId, to: &VillagerId) -> bool
where
    L: InstanceTradeLedger + ?Sized,
{
    let granted: Vec<TradeId> = ledger.granted(from).to_vec();
    let carried = !granted.is_empty();

    ledger.clear(to);
    for id in granted {
        ledger.append(to, id);
    }
    tracing::debug!(from = %from, to = %to, carried, "Copied trade ledger");
    carried
}

/// Forget a villager's history and roll `level * 2` fresh offers
pub fn manual_reroll<'c, L, R>(
    catalog: &'c TradeCatalog,
    ledger: &mut L,
    merchant: &Merchant,
    rng: &mut R,
) -> Result<Vec<&'c TradeDefinition>, RerollError>
where
    L: InstanceTradeLedger + ?Sized,
    R: RandomSource + ?Sized,
{
    if merchant.kind != MerchantKind::Villager {
        return Err(RerollError::NotAVillager(merchant.id.clone()));
    }

    ledger.clear(&merchant.id);
    if merchant.offer_count == 0 {
        return Err(RerollError::NoTrades(merchant.id.clone()));
    }

    let slots = usize::from(merchant.level) * 2;
    let offers = bulk_reroll(
        catalog,
        ledger,
        &merchant.id,
        merchant.profession,
        merchant.villager_type,
        slots,
        rng,
    );
    tracing::info!(villager = %merchant.id, offers = offers.len(), "Rerolled villager trades");
    Ok(offers)
}
