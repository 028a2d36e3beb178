//! Trade definitions and the item payloads they carry
//!
//! The item fields are opaque to selection; they are carried through so the
//! host game can build its merchant recipe from them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::error::{Axis, DefinitionError};
use crate::villager::{is_valid_level, Level, Profession, VillagerType, LEVELS};

/// Unique trade identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::borrow::Borrow<str> for TradeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TradeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TradeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TradeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Enchantment applied to an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEnchantment {
    /// Namespaced key, e.g. `minecraft:sharpness`
    pub key: String,
    pub level: u32,
    pub ignore_level_restriction: bool,
}

/// How an attribute modifier combines with the base value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ModifierOperation {
    #[strum(serialize = "ADD")]
    AddNumber,
    #[strum(serialize = "MULTIPLY")]
    AddScalar,
    #[strum(serialize = "MULTIPLY_ALL_MODIFIERS")]
    MultiplyScalar,
}

/// Attribute modifier applied to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeModifier {
    pub attribute: String,
    pub amount: f64,
    pub operation: ModifierOperation,
    pub slot: Option<String>,
}

/// An item stack offered or requested by a trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeItem {
    pub material: String,
    pub amount: u32,
    /// Raw NBT applied by the host as-is
    pub nbt: Option<String>,
    pub display_name: Option<String>,
    pub lore: Vec<String>,
    pub enchantments: Vec<ItemEnchantment>,
    pub attribute_modifiers: Vec<AttributeModifier>,
}

impl TradeItem {
    pub fn new(material: impl Into<String>, amount: u32) -> Self {
        Self {
            material: material.into(),
            amount,
            nbt: None,
            display_name: None,
            lore: Vec::new(),
            enchantments: Vec::new(),
            attribute_modifiers: Vec::new(),
        }
    }
}

/// Default number of uses before a trade locks
pub const DEFAULT_MAX_USES: u32 = 12;

/// One custom trade of the catalog
///
/// Restrictions left as `None` apply to every value of their axis. The
/// catalog resolves them into concrete index membership at registration.
/// Deserializing goes through [`TradeDefinition::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DefinitionFields")]
pub struct TradeDefinition {
    id: TradeId,
    outcome: TradeItem,
    ingredients: Vec<TradeItem>,
    max_uses: u32,
    price_multiplier: f32,
    experience_awarded: u32,
    awards_player_experience: bool,
    ignore_discounts: bool,
    professions: Option<BTreeSet<Profession>>,
    sub_types: Option<BTreeSet<VillagerType>>,
    levels: Option<BTreeSet<Level>>,
}

/// Unchecked wire form of [`TradeDefinition`]
#[derive(Deserialize)]
struct DefinitionFields {
    id: TradeId,
    outcome: TradeItem,
    ingredients: Vec<TradeItem>,
    max_uses: u32,
    price_multiplier: f32,
    experience_awarded: u32,
    awards_player_experience: bool,
    ignore_discounts: bool,
    professions: Option<BTreeSet<Profession>>,
    sub_types: Option<BTreeSet<VillagerType>>,
    levels: Option<BTreeSet<Level>>,
}

impl TryFrom<DefinitionFields> for TradeDefinition {
    type Error = DefinitionError;

    fn try_from(fields: DefinitionFields) -> Result<Self, Self::Error> {
        let definition = Self {
            id: fields.id,
            outcome: fields.outcome,
            ingredients: fields.ingredients,
            max_uses: fields.max_uses,
            price_multiplier: fields.price_multiplier,
            experience_awarded: fields.experience_awarded,
            awards_player_experience: fields.awards_player_experience,
            ignore_discounts: fields.ignore_discounts,
            professions: fields.professions,
            sub_types: fields.sub_types,
            levels: fields.levels,
        };
        definition.validate()?;
        Ok(definition)
    }
}

impl TradeDefinition {
    /// Create an unrestricted trade with one ingredient
    pub fn new(id: impl Into<TradeId>, outcome: TradeItem, ingredient: TradeItem) -> Self {
        Self {
            id: id.into(),
            outcome,
            ingredients: vec![ingredient],
            max_uses: DEFAULT_MAX_USES,
            price_multiplier: 0.0,
            experience_awarded: 0,
            awards_player_experience: false,
            ignore_discounts: false,
            professions: None,
            sub_types: None,
            levels: None,
        }
    }

    /// Set the second ingredient, replacing any previous one
    pub fn with_second_ingredient(mut self, ingredient: TradeItem) -> Self {
        self.ingredients.truncate(1);
        self.ingredients.push(ingredient);
        self
    }

    pub fn with_max_uses(mut self, max_uses: u32) -> Self {
        self.max_uses = max_uses;
        self
    }

    pub fn with_price_multiplier(mut self, multiplier: f32) -> Self {
        self.price_multiplier = multiplier;
        self
    }

    pub fn with_experience(mut self, villager_experience: u32, award_player: bool) -> Self {
        self.experience_awarded = villager_experience;
        self.awards_player_experience = award_player;
        self
    }

    pub fn with_ignore_discounts(mut self, ignore: bool) -> Self {
        self.ignore_discounts = ignore;
        self
    }

    /// Restrict the trade to the given professions
    pub fn restrict_professions(mut self, professions: impl IntoIterator<Item = Profession>) -> Self {
        self.professions = Some(professions.into_iter().collect());
        self
    }

    /// Restrict the trade to the given villager types
    pub fn restrict_sub_types(mut self, types: impl IntoIterator<Item = VillagerType>) -> Self {
        self.sub_types = Some(types.into_iter().collect());
        self
    }

    /// Restrict the trade to the given levels
    pub fn restrict_levels(mut self, levels: impl IntoIterator<Item = Level>) -> Self {
        self.levels = Some(levels.into_iter().collect());
        self
    }

    pub fn id(&self) -> &TradeId {
        &self.id
    }

    pub fn outcome(&self) -> &TradeItem {
        &self.outcome
    }

    /// One or two ingredients, in recipe order
    pub fn ingredients(&self) -> &[TradeItem] {
        &self.ingredients
    }

    pub fn max_uses(&self) -> u32 {
        self.max_uses
    }

    pub fn price_multiplier(&self) -> f32 {
        self.price_multiplier
    }

    pub fn experience_awarded(&self) -> u32 {
        self.experience_awarded
    }

    pub fn awards_player_experience(&self) -> bool {
        self.awards_player_experience
    }

    pub fn ignore_discounts(&self) -> bool {
        self.ignore_discounts
    }

    pub fn professions(&self) -> Option<&BTreeSet<Profession>> {
        self.professions.as_ref()
    }

    pub fn sub_types(&self) -> Option<&BTreeSet<VillagerType>> {
        self.sub_types.as_ref()
    }

    pub fn levels(&self) -> Option<&BTreeSet<Level>> {
        self.levels.as_ref()
    }

    /// Check the shape the builder guarantees: a non-empty id, one or two
    /// ingredients, and restrictions that are absent or name indexed values
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.id.as_str().is_empty() {
            return Err(DefinitionError::MissingId);
        }
        match self.ingredients.len() {
            0 => return Err(DefinitionError::MissingIngredients),
            1 | 2 => {}
            n => return Err(DefinitionError::TooManyIngredients(n)),
        }

        if let Some(professions) = &self.professions {
            if professions.is_empty() {
                return Err(DefinitionError::EmptyRestriction(Axis::Profession));
            }
            if let Some(p) = professions.iter().find(|p| !p.can_trade()) {
                return Err(DefinitionError::UnknownProfession(p.to_string()));
            }
        }
        if self.sub_types.as_ref().is_some_and(BTreeSet::is_empty) {
            return Err(DefinitionError::EmptyRestriction(Axis::SubType));
        }
        if let Some(levels) = &self.levels {
            if levels.is_empty() {
                return Err(DefinitionError::EmptyRestriction(Axis::Level));
            }
            if let Some(l) = levels.iter().find(|l| !is_valid_level(**l)) {
                return Err(DefinitionError::LevelOutOfRange(*l));
            }
        }
        Ok(())
    }

    /// Professions this trade is indexed under
    pub fn resolved_professions(&self) -> Vec<Profession> {
        match &self.professions {
            Some(set) => set.iter().copied().collect(),
            None => Profession::trading().collect(),
        }
    }

    /// Villager types this trade is indexed under
    pub fn resolved_sub_types(&self) -> Vec<VillagerType> {
        use strum::IntoEnumIterator;

        match &self.sub_types {
            Some(set) => set.iter().copied().collect(),
            None => VillagerType::iter().collect(),
        }
    }

    /// Levels this trade is indexed under
    pub fn resolved_levels(&self) -> Vec<Level> {
        match &self.levels {
            Some(set) => set.iter().copied().collect(),
            None => LEVELS.collect(),
        }
    }
}
