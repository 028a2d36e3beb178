//! Villager vocabulary: professions, biome types, levels and identities
//!
//! These are the three categorical axes a custom trade can be restricted on,
//! plus the opaque identity under which granted trades are recorded.

use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Villager professions
///
/// `None` and `Nitwit` are sentinels for villagers that cannot trade. They
/// never own an index bucket.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Profession {
    None,
    Armorer,
    Butcher,
    Cartographer,
    Cleric,
    Farmer,
    Fisherman,
    Fletcher,
    Leatherworker,
    Librarian,
    Mason,
    Nitwit,
    Shepherd,
    Toolsmith,
    Weaponsmith,
}

impl Profession {
    /// Check if villagers of this profession can hold trades at all
    pub const fn can_trade(&self) -> bool {
        !matches!(self, Profession::None | Profession::Nitwit)
    }

    /// All professions that own a bucket in the profession index
    pub fn trading() -> impl Iterator<Item = Profession> {
        Profession::iter().filter(Profession::can_trade)
    }
}

/// Villager biome types (the sub-type axis)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum VillagerType {
    Desert,
    Jungle,
    #[default]
    Plains,
    Savanna,
    Snow,
    Swamp,
    Taiga,
}

/// Villager experience level (novice = 1 .. master = 5)
pub type Level = u8;

/// Every level a trade can be restricted to
pub const LEVELS: RangeInclusive<Level> = 1..=5;

/// Check if a level belongs to the indexed domain
pub fn is_valid_level(level: Level) -> bool {
    LEVELS.contains(&level)
}

/// Opaque identity of one villager instance (usually an entity UUID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VillagerId(String);

impl VillagerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for VillagerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VillagerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of merchant entity asking for a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MerchantKind {
    #[default]
    Villager,
    WanderingTrader,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trading_professions_exclude_sentinels() {
        let trading: Vec<_> = Profession::trading().collect();
        assert_eq!(trading.len(), 13);
        assert!(!trading.contains(&Profession::None));
        assert!(!trading.contains(&Profession::Nitwit));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("FARMER".parse::<Profession>(), Ok(Profession::Farmer));
        assert_eq!("farmer".parse::<Profession>(), Ok(Profession::Farmer));
        assert_eq!(
            "LEATHERWORKER".parse::<Profession>(),
            Ok(Profession::Leatherworker)
        );
        assert_eq!("snow".parse::<VillagerType>(), Ok(VillagerType::Snow));
        assert!("BLACKSMITH".parse::<Profession>().is_err());
    }

    #[test]
    fn test_display_matches_config_names() {
        assert_eq!(Profession::Weaponsmith.to_string(), "WEAPONSMITH");
        assert_eq!(VillagerType::Savanna.to_string(), "SAVANNA");
    }

    #[test]
    fn test_level_domain() {
        assert!(!is_valid_level(0));
        assert!(is_valid_level(1));
        assert!(is_valid_level(5));
        assert!(!is_valid_level(6));
        assert_eq!(LEVELS.count(), 5);
    }
}
