//! Random selection of eligible, not yet granted trades
//!
//! Each draw is uniform over the candidates still in play. A candidate the
//! villager already holds is dropped from the working set before the next
//! draw, so a pick takes at most as many draws as there are candidates.

use super::{InstanceTradeLedger, TradeCatalog, TradeDefinition, TradeId};
use crate::rng::RandomSource;
use crate::villager::{Level, Profession, VillagerId, VillagerType};

/// Pick a random eligible trade that this villager has not been granted yet
///
/// Returns `None` when no trade is eligible or every eligible trade is
/// already in the ledger. The ledger is not consulted for an empty
/// candidate set.
pub fn pick_random_eligible<'c, L, R>(
    catalog: &'c TradeCatalog,
    ledger: &L,
    villager: &VillagerId,
    profession: Profession,
    sub_type: VillagerType,
    level: Level,
    rng: &mut R,
) -> Option<&'c TradeDefinition>
where
    L: InstanceTradeLedger + ?Sized,
    R: RandomSource + ?Sized,
{
    let mut candidates: Vec<&TradeId> = catalog
        .lookup_eligible(profession, sub_type, level)
        .into_iter()
        .collect();
    if candidates.is_empty() {
        return None;
    }
    // Hash order differs between processes; sort so a seed replays the same picks.
    candidates.sort_unstable();

    while !candidates.is_empty() {
        let index = rng.rn2(candidates.len() as u32) as usize;
        let id = candidates[index];
        if ledger.contains(villager, id) {
            candidates.swap_remove(index);
            continue;
        }

        tracing::debug!(
            villager = %villager,
            trade_id = %id,
            %profession,
            %sub_type,
            level,
            "Picked custom trade"
        );
        return catalog.get(id.as_str());
    }

    tracing::debug!(
        villager = %villager,
        %profession,
        %sub_type,
        level,
        "Every eligible trade already granted"
    );
    None
}

/// Level used for a slot during a bulk reroll: two slots per level
///
/// Slot indexes 0, 1, 2, 3, 4, 5 map to levels 1, 1, 2, 2, 3, 3.
pub fn slot_level(slot: usize) -> Level {
    Level::try_from(slot / 2 + 1).unwrap_or(Level::MAX)
}

/// Regenerate a villager's offer list up to `target_slot_count` slots
///
/// Each picked trade is recorded in the ledger before the next slot is
/// drawn, so one reroll never offers the same trade twice. Slots with no
/// available trade are skipped and the returned list may be shorter.
pub fn bulk_reroll<'c, L, R>(
    catalog: &'c TradeCatalog,
    ledger: &mut L,
    villager: &VillagerId,
    profession: Profession,
    sub_type: VillagerType,
    target_slot_count: usize,
    rng: &mut R,
) -> Vec<&'c TradeDefinition>
where
    L: InstanceTradeLedger + ?Sized,
    R: RandomSource + ?Sized,
{
    let mut offers = Vec::with_capacity(target_slot_count);

    for slot in 0..target_slot_count {
        let level = slot_level(slot);
        if let Some(trade) = pick_random_eligible(
            catalog,
            &*ledger,
            villager,
            profession,
            sub_type,
            level,
            &mut *rng,
        ) {
            ledger.append(villager, trade.id().clone());
            offers.push(trade);
        }
    }

    tracing::debug!(
        villager = %villager,
        offered = offers.len(),
        slots = target_slot_count,
        "Rerolled custom trades"
    );
    offers
}
