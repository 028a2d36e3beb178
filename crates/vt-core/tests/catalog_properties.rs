use std::cell::Cell;

use proptest::prelude::*;
use proptest::sample::subsequence;
use strum::IntoEnumIterator;
use vt_core::{
    pick_random_eligible, CatalogError, InstanceTradeLedger, Level, MemoryLedger, Profession,
    TradeCatalog, TradeDefinition, TradeId, TradeItem, TradeRng, VillagerId, VillagerType,
    LEVELS,
};

fn trading_professions() -> Vec<Profession> {
    Profession::trading().collect()
}

fn definition_strategy() -> impl Strategy<Value = TradeDefinition> {
    (
        0u8..8,
        proptest::option::of(subsequence(trading_professions(), 1..=13)),
        proptest::option::of(subsequence(VillagerType::iter().collect::<Vec<_>>(), 1..=7)),
        proptest::option::of(subsequence(LEVELS.collect::<Vec<Level>>(), 1..=5)),
    )
        .prop_map(|(n, professions, types, levels)| {
            let mut trade = TradeDefinition::new(
                format!("t{n}"),
                TradeItem::new("BREAD", 1),
                TradeItem::new("EMERALD", 1),
            );
            if let Some(professions) = professions {
                trade = trade.restrict_professions(professions);
            }
            if let Some(types) = types {
                trade = trade.restrict_sub_types(types);
            }
            if let Some(levels) = levels {
                trade = trade.restrict_levels(levels);
            }
            trade
        })
}

/// Register a sequence, checking that rejected duplicates leave no trace
fn build(definitions: Vec<TradeDefinition>) -> TradeCatalog {
    let mut catalog = TradeCatalog::new();
    for definition in definitions {
        let before = catalog.clone();
        let id = definition.id().clone();
        match catalog.register(definition) {
            Ok(()) => assert!(catalog.contains(id.as_str())),
            Err(err) => {
                assert_eq!(err, CatalogError::DuplicateId(id));
                assert_eq!(catalog, before);
            }
        }
    }
    catalog
}

fn eligible_by_scan(
    catalog: &TradeCatalog,
    profession: Profession,
    sub_type: VillagerType,
    level: Level,
) -> Vec<String> {
    let mut ids: Vec<String> = catalog
        .iter()
        .filter(|t| {
            t.resolved_professions().contains(&profession)
                && t.resolved_sub_types().contains(&sub_type)
                && t.resolved_levels().contains(&level)
        })
        .map(|t| t.id().to_string())
        .collect();
    ids.sort();
    ids
}

proptest! {
    #[test]
    fn indexes_match_registered_restrictions(
        definitions in proptest::collection::vec(definition_strategy(), 0..24)
    ) {
        let catalog = build(definitions);

        for trade in catalog.iter() {
            let id = trade.id().as_str();
            let professions = trade.resolved_professions();
            for p in Profession::trading() {
                let bucket = catalog.profession_bucket(p).unwrap();
                prop_assert_eq!(bucket.contains(id), professions.contains(&p));
            }
            let types = trade.resolved_sub_types();
            for t in VillagerType::iter() {
                let bucket = catalog.sub_type_bucket(t).unwrap();
                prop_assert_eq!(bucket.contains(id), types.contains(&t));
            }
            let levels = trade.resolved_levels();
            for l in LEVELS {
                let bucket = catalog.level_bucket(l).unwrap();
                prop_assert_eq!(bucket.contains(id), levels.contains(&l));
            }
        }

        for p in Profession::trading() {
            for id in catalog.profession_bucket(p).unwrap() {
                prop_assert!(catalog.contains(id.as_str()));
            }
        }
        for l in LEVELS {
            for id in catalog.level_bucket(l).unwrap() {
                prop_assert!(catalog.contains(id.as_str()));
            }
        }
    }

    #[test]
    fn lookup_equals_bucket_intersection(
        definitions in proptest::collection::vec(definition_strategy(), 0..24)
    ) {
        let catalog = build(definitions);

        for p in Profession::trading() {
            for t in VillagerType::iter() {
                for l in LEVELS {
                    let mut found: Vec<String> = catalog
                        .lookup_eligible(p, t, l)
                        .into_iter()
                        .map(TradeId::to_string)
                        .collect();
                    found.sort();
                    prop_assert_eq!(found, eligible_by_scan(&catalog, p, t, l));
                }
            }
        }
    }

    #[test]
    fn selection_never_returns_granted_trade(
        definitions in proptest::collection::vec(definition_strategy(), 1..24),
        granted in subsequence((0u8..8).collect::<Vec<_>>(), 0..=8),
        profession in proptest::sample::select(trading_professions()),
        sub_type in proptest::sample::select(VillagerType::iter().collect::<Vec<_>>()),
        level in 1u8..=5,
        seed in any::<u64>(),
    ) {
        let catalog = build(definitions);
        let villager = VillagerId::new("v");
        let mut ledger = MemoryLedger::new();
        for n in granted {
            ledger.append(&villager, TradeId::new(format!("t{n}")));
        }

        let eligible = eligible_by_scan(&catalog, profession, sub_type, level);
        let picked = pick_random_eligible(
            &catalog,
            &ledger,
            &villager,
            profession,
            sub_type,
            level,
            &mut TradeRng::new(seed),
        );

        match picked {
            Some(trade) => {
                prop_assert!(!ledger.contains(&villager, trade.id()));
                prop_assert!(eligible.contains(&trade.id().to_string()));
            }
            None => {
                for id in &eligible {
                    prop_assert!(ledger.contains(&villager, &TradeId::new(id.as_str())));
                }
            }
        }
    }
}

/// Ledger that counts how often it is consulted
#[derive(Default)]
struct SpyLedger {
    inner: MemoryLedger,
    reads: Cell<usize>,
}

impl InstanceTradeLedger for SpyLedger {
    fn granted(&self, villager: &VillagerId) -> &[TradeId] {
        self.reads.set(self.reads.get() + 1);
        self.inner.granted(villager)
    }

    fn append(&mut self, villager: &VillagerId, id: TradeId) {
        self.inner.append(villager, id);
    }

    fn clear(&mut self, villager: &VillagerId) {
        self.inner.clear(villager);
    }
}

#[test]
fn empty_catalog_does_not_consult_ledger() {
    let catalog = TradeCatalog::new();
    let ledger = SpyLedger::default();
    let mut rng = TradeRng::new(0);

    for p in Profession::iter() {
        for t in VillagerType::iter() {
            for l in LEVELS {
                assert!(catalog.lookup_eligible(p, t, l).is_empty());
                let picked = pick_random_eligible(
                    &catalog,
                    &ledger,
                    &VillagerId::new("v"),
                    p,
                    t,
                    l,
                    &mut rng,
                );
                assert!(picked.is_none());
            }
        }
    }
    assert_eq!(ledger.reads.get(), 0);
}

#[test]
fn farmer_with_a_and_c_granted_always_gets_b() {
    let mut catalog = TradeCatalog::new();
    let item = || TradeItem::new("EMERALD", 1);
    catalog
        .register(
            TradeDefinition::new("A", item(), item())
                .restrict_professions([Profession::Farmer])
                .restrict_levels([1, 2]),
        )
        .unwrap();
    catalog
        .register(TradeDefinition::new("B", item(), item()).restrict_levels([1]))
        .unwrap();
    catalog
        .register(
            TradeDefinition::new("C", item(), item())
                .restrict_professions([Profession::Farmer])
                .restrict_levels([1]),
        )
        .unwrap();

    let villager = VillagerId::new("x");
    let mut ledger = MemoryLedger::new();
    ledger.append(&villager, TradeId::new("A"));
    ledger.append(&villager, TradeId::new("C"));

    for seed in 0..100 {
        let picked = pick_random_eligible(
            &catalog,
            &ledger,
            &villager,
            Profession::Farmer,
            VillagerType::Savanna,
            1,
            &mut TradeRng::new(seed),
        );
        assert_eq!(picked.map(|t| t.id().as_str()), Some("B"));
    }
}
