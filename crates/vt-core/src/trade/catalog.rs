//! Trade catalog with its three categorical indexes
//!
//! Every profession, villager type and level of the domain owns a bucket from
//! construction on, so lookups never miss on a key that should exist. A
//! trade with no restriction on an axis lands in every bucket of that axis.

use hashbrown::{HashMap, HashSet};
use strum::IntoEnumIterator;

use super::error::{Axis, CatalogError};
use super::{TradeDefinition, TradeId};
use crate::villager::{Level, Profession, VillagerType, LEVELS};

/// Registry of custom trades, indexed by profession, villager type and level
#[derive(Debug, Clone, PartialEq)]
pub struct TradeCatalog {
    by_id: HashMap<TradeId, TradeDefinition>,
    profession_index: HashMap<Profession, HashSet<TradeId>>,
    sub_type_index: HashMap<VillagerType, HashSet<TradeId>>,
    level_index: HashMap<Level, HashSet<TradeId>>,
}

impl Default for TradeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeCatalog {
    /// Create an empty catalog with every bucket pre-created
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            profession_index: Profession::trading().map(|p| (p, HashSet::new())).collect(),
            sub_type_index: VillagerType::iter().map(|t| (t, HashSet::new())).collect(),
            level_index: LEVELS.map(|l| (l, HashSet::new())).collect(),
        }
    }

    /// Register a trade under its id
    ///
    /// The definition is checked against the indexed domain before anything
    /// is written, so an error leaves the catalog untouched.
    pub fn register(&mut self, definition: TradeDefinition) -> Result<(), CatalogError> {
        let id = definition.id().clone();
        if self.by_id.contains_key(&id) {
            return Err(CatalogError::DuplicateId(id));
        }

        let professions = definition.resolved_professions();
        let sub_types = definition.resolved_sub_types();
        let levels = definition.resolved_levels();

        let empty_axis = [
            (Axis::Profession, professions.is_empty()),
            (Axis::SubType, sub_types.is_empty()),
            (Axis::Level, levels.is_empty()),
        ]
        .into_iter()
        .find_map(|(axis, empty)| empty.then_some(axis));
        if let Some(axis) = empty_axis {
            return Err(CatalogError::EmptyRestriction { id, axis });
        }

        if let Some(p) = professions
            .iter()
            .find(|p| !self.profession_index.contains_key(*p))
        {
            return Err(CatalogError::Unindexed {
                id,
                axis: Axis::Profession,
                value: p.to_string(),
            });
        }
        if let Some(l) = levels.iter().find(|l| !self.level_index.contains_key(*l)) {
            return Err(CatalogError::Unindexed {
                id,
                axis: Axis::Level,
                value: l.to_string(),
            });
        }

        for p in professions {
            if let Some(bucket) = self.profession_index.get_mut(&p) {
                bucket.insert(id.clone());
            }
        }
        for t in sub_types {
            if let Some(bucket) = self.sub_type_index.get_mut(&t) {
                bucket.insert(id.clone());
            }
        }
        for l in levels {
            if let Some(bucket) = self.level_index.get_mut(&l) {
                bucket.insert(id.clone());
            }
        }

        tracing::debug!(trade_id = %id, "Registered custom trade");
        self.by_id.insert(id, definition);
        Ok(())
    }

    /// Remove a trade and purge it from all three indexes
    pub fn unregister(&mut self, id: &str) -> Result<TradeDefinition, CatalogError> {
        let definition = self
            .by_id
            .remove(id)
            .ok_or_else(|| CatalogError::UnknownTrade(TradeId::new(id)))?;

        for bucket in self.profession_index.values_mut() {
            bucket.remove(id);
        }
        for bucket in self.sub_type_index.values_mut() {
            bucket.remove(id);
        }
        for bucket in self.level_index.values_mut() {
            bucket.remove(id);
        }

        tracing::debug!(trade_id = %id, "Unregistered custom trade");
        Ok(definition)
    }

    /// Ids of every trade legal for this profession, villager type and level
    ///
    /// Values without a bucket (non-trading professions, levels outside the
    /// domain) match nothing. Iteration order is unspecified.
    pub fn lookup_eligible(
        &self,
        profession: Profession,
        sub_type: VillagerType,
        level: Level,
    ) -> HashSet<&TradeId> {
        let (Some(by_profession), Some(by_type), Some(by_level)) = (
            self.profession_index.get(&profession),
            self.sub_type_index.get(&sub_type),
            self.level_index.get(&level),
        ) else {
            return HashSet::new();
        };

        let mut buckets = [by_profession, by_type, by_level];
        buckets.sort_by_key(|bucket| bucket.len());
        let [smallest, middle, largest] = buckets;

        smallest
            .iter()
            .filter(|id| middle.contains(*id) && largest.contains(*id))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&TradeDefinition> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterate all registered trades in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &TradeDefinition> {
        self.by_id.values()
    }

    pub fn profession_bucket(&self, profession: Profession) -> Option<&HashSet<TradeId>> {
        self.profession_index.get(&profession)
    }

    pub fn sub_type_bucket(&self, sub_type: VillagerType) -> Option<&HashSet<TradeId>> {
        self.sub_type_index.get(&sub_type)
    }

    pub fn level_bucket(&self, level: Level) -> Option<&HashSet<TradeId>> {
        self.level_index.get(&level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::TradeItem;

    fn trade(id: &str) -> TradeDefinition {
        TradeDefinition::new(id, TradeItem::new("BREAD", 1), TradeItem::new("EMERALD", 1))
    }

    fn sorted(ids: HashSet<&TradeId>) -> Vec<&str> {
        let mut ids: Vec<_> = ids.into_iter().map(TradeId::as_str).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_new_catalog_has_every_bucket() {
        let catalog = TradeCatalog::new();
        for p in Profession::trading() {
            assert!(catalog.profession_bucket(p).is_some_and(HashSet::is_empty));
        }
        for t in VillagerType::iter() {
            assert!(catalog.sub_type_bucket(t).is_some());
        }
        for l in LEVELS {
            assert!(catalog.level_bucket(l).is_some());
        }
        assert!(catalog.profession_bucket(Profession::Nitwit).is_none());
        assert!(catalog.level_bucket(0).is_none());
    }

    #[test]
    fn test_unrestricted_trade_lands_everywhere() {
        let mut catalog = TradeCatalog::new();
        catalog.register(trade("any")).unwrap();

        for p in Profession::trading() {
            assert!(catalog.profession_bucket(p).unwrap().contains("any"));
        }
        for t in VillagerType::iter() {
            assert!(catalog.sub_type_bucket(t).unwrap().contains("any"));
        }
        for l in LEVELS {
            assert!(catalog.level_bucket(l).unwrap().contains("any"));
        }
    }

    #[test]
    fn test_restricted_trade_lands_only_in_its_buckets() {
        let mut catalog = TradeCatalog::new();
        catalog
            .register(
                trade("fish")
                    .restrict_professions([Profession::Fisherman])
                    .restrict_sub_types([VillagerType::Swamp])
                    .restrict_levels([3]),
            )
            .unwrap();

        assert!(catalog.profession_bucket(Profession::Fisherman).unwrap().contains("fish"));
        assert!(!catalog.profession_bucket(Profession::Farmer).unwrap().contains("fish"));
        assert!(catalog.sub_type_bucket(VillagerType::Swamp).unwrap().contains("fish"));
        assert!(!catalog.sub_type_bucket(VillagerType::Snow).unwrap().contains("fish"));
        assert!(catalog.level_bucket(3).unwrap().contains("fish"));
        assert!(!catalog.level_bucket(1).unwrap().contains("fish"));
    }

    #[test]
    fn test_duplicate_registration_is_rejected_without_change() {
        let mut catalog = TradeCatalog::new();
        catalog
            .register(trade("dup").restrict_professions([Profession::Mason]))
            .unwrap();
        let before = catalog.clone();

        let result = catalog.register(trade("dup").restrict_levels([4]));
        assert_eq!(result, Err(CatalogError::DuplicateId(TradeId::new("dup"))));
        assert_eq!(catalog, before);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_unindexed_value_is_rejected_without_change() {
        let mut catalog = TradeCatalog::new();
        let before = catalog.clone();

        let result = catalog.register(trade("lazy").restrict_professions([
            Profession::Farmer,
            Profession::Nitwit,
        ]));
        assert!(matches!(
            result,
            Err(CatalogError::Unindexed {
                axis: Axis::Profession,
                ..
            })
        ));

        let result = catalog.register(trade("high").restrict_levels([5, 9]));
        assert!(matches!(
            result,
            Err(CatalogError::Unindexed {
                axis: Axis::Level,
                ..
            })
        ));
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_empty_restriction_is_rejected_without_change() {
        let mut catalog = TradeCatalog::new();
        let before = catalog.clone();

        let result = catalog.register(trade("nobody").restrict_professions([]));
        assert_eq!(
            result,
            Err(CatalogError::EmptyRestriction {
                id: TradeId::new("nobody"),
                axis: Axis::Profession,
            })
        );

        let result = catalog.register(trade("never").restrict_levels([]));
        assert!(matches!(
            result,
            Err(CatalogError::EmptyRestriction {
                axis: Axis::Level,
                ..
            })
        ));
        assert_eq!(catalog, before);
        assert!(!catalog.contains("nobody"));
    }

    #[test]
    fn test_lookup_is_intersection() {
        let mut catalog = TradeCatalog::new();
        catalog
            .register(
                trade("a")
                    .restrict_professions([Profession::Farmer])
                    .restrict_levels([1, 2]),
            )
            .unwrap();
        catalog.register(trade("b").restrict_levels([1])).unwrap();
        catalog
            .register(
                trade("c")
                    .restrict_professions([Profession::Farmer])
                    .restrict_levels([1]),
            )
            .unwrap();

        assert_eq!(
            sorted(catalog.lookup_eligible(Profession::Farmer, VillagerType::Desert, 1)),
            ["a", "b", "c"]
        );
        assert_eq!(
            sorted(catalog.lookup_eligible(Profession::Farmer, VillagerType::Desert, 2)),
            ["a"]
        );
        assert_eq!(
            sorted(catalog.lookup_eligible(Profession::Cleric, VillagerType::Taiga, 1)),
            ["b"]
        );
        assert!(catalog
            .lookup_eligible(Profession::Cleric, VillagerType::Taiga, 2)
            .is_empty());
    }

    #[test]
    fn test_lookup_unknown_values_is_empty() {
        let mut catalog = TradeCatalog::new();
        catalog.register(trade("any")).unwrap();

        assert!(catalog.lookup_eligible(Profession::None, VillagerType::Plains, 1).is_empty());
        assert!(catalog.lookup_eligible(Profession::Nitwit, VillagerType::Plains, 1).is_empty());
        assert!(catalog.lookup_eligible(Profession::Farmer, VillagerType::Plains, 0).is_empty());
        assert!(catalog.lookup_eligible(Profession::Farmer, VillagerType::Plains, 6).is_empty());
    }

    #[test]
    fn test_empty_catalog_lookup() {
        let catalog = TradeCatalog::new();
        assert!(catalog.is_empty());
        for p in Profession::iter() {
            for t in VillagerType::iter() {
                for l in 0..=6 {
                    assert!(catalog.lookup_eligible(p, t, l).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_unregister_purges_indexes() {
        let mut catalog = TradeCatalog::new();
        catalog.register(trade("gone")).unwrap();
        catalog.register(trade("kept")).unwrap();

        let removed = catalog.unregister("gone").unwrap();
        assert_eq!(removed.id().as_str(), "gone");
        assert!(!catalog.contains("gone"));
        for p in Profession::trading() {
            assert!(!catalog.profession_bucket(p).unwrap().contains("gone"));
        }
        for t in VillagerType::iter() {
            assert!(!catalog.sub_type_bucket(t).unwrap().contains("gone"));
        }
        for l in LEVELS {
            assert!(!catalog.level_bucket(l).unwrap().contains("gone"));
        }
        assert_eq!(
            sorted(catalog.lookup_eligible(Profession::Mason, VillagerType::Snow, 4)),
            ["kept"]
        );

        assert_eq!(
            catalog.unregister("gone"),
            Err(CatalogError::UnknownTrade(TradeId::new("gone")))
        );
    }
}
