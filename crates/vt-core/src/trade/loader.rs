//! Loading custom trades from a JSON definition file
//!
//! The document holds a `trades` list. Every record is decoded and validated
//! on its own: a bad record is reported and skipped, the rest still load.

use std::path::Path;

use serde::Deserialize;

use super::error::{Axis, DefinitionError, LoadError, RecordError};
use super::{
    AttributeModifier, ItemEnchantment, ModifierOperation, TradeCatalog, TradeDefinition,
    TradeItem, DEFAULT_MAX_USES,
};
use crate::villager::{is_valid_level, Level, Profession, VillagerType};

/// Outcome of loading one definition source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Records registered in the catalog
    pub loaded: usize,
    /// Records found in the source
    pub total: usize,
    pub failures: Vec<RecordFailure>,
}

/// A record that was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// Position of the record in the `trades` list
    pub index: usize,
    pub id: Option<String>,
    pub error: RecordError,
}

#[derive(Debug, Deserialize)]
struct TradeFile {
    #[serde(default)]
    trades: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TradeRecord {
    #[serde(alias = "ID")]
    id: Option<String>,
    result: Option<ItemRecord>,
    #[serde(default)]
    ingredients: Vec<ItemRecord>,
    #[serde(default = "default_max_uses")]
    max_uses: u32,
    #[serde(default)]
    price_multiplier: f32,
    #[serde(default)]
    experience: u32,
    #[serde(default)]
    give_experience_to_player: bool,
    #[serde(default)]
    ignore_discounts: bool,
    professions: Option<Vec<String>>,
    villager_types: Option<Vec<String>>,
    levels: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ItemRecord {
    material: String,
    #[serde(default = "default_amount")]
    amount: u32,
    nbt: Option<String>,
    #[serde(alias = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    lore: Vec<String>,
    #[serde(default)]
    enchantments: Vec<EnchantmentRecord>,
    #[serde(default, alias = "attributeModifiers")]
    attribute_modifiers: Vec<ModifierRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct EnchantmentRecord {
    #[serde(rename = "type")]
    key: String,
    #[serde(default = "default_amount")]
    level: u32,
    #[serde(default, alias = "ignoreLevelRestriction")]
    ignore_level_restriction: bool,
}

#[derive(Debug, Deserialize)]
struct ModifierRecord {
    name: String,
    amount: f64,
    operation: String,
    slot: Option<String>,
}

fn default_max_uses() -> u32 {
    DEFAULT_MAX_USES
}

fn default_amount() -> u32 {
    1
}

impl ItemRecord {
    fn into_item(self) -> Result<TradeItem, DefinitionError> {
        let enchantments = self
            .enchantments
            .into_iter()
            .map(|e| {
                match e.key.split_once(':') {
                    Some((ns, key)) if !ns.is_empty() && !key.is_empty() => {}
                    _ => return Err(DefinitionError::InvalidEnchantment(e.key)),
                }
                Ok(ItemEnchantment {
                    key: e.key.to_lowercase(),
                    level: e.level,
                    ignore_level_restriction: e.ignore_level_restriction,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let attribute_modifiers = self
            .attribute_modifiers
            .into_iter()
            .map(|m| match m.operation.parse::<ModifierOperation>() {
                Ok(operation) => Ok(AttributeModifier {
                    attribute: m.name.to_uppercase(),
                    amount: m.amount,
                    operation,
                    slot: m.slot.map(|s| s.to_uppercase()),
                }),
                Err(_) => Err(DefinitionError::InvalidOperation(m.operation)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TradeItem {
            material: self.material,
            amount: self.amount,
            nbt: self.nbt,
            display_name: self.display_name,
            lore: self.lore,
            enchantments,
            attribute_modifiers,
        })
    }
}

/// Explicit restriction lists must name at least one value
fn non_empty<T>(list: Option<Vec<T>>, axis: Axis) -> Result<Option<Vec<T>>, DefinitionError> {
    match list {
        Some(values) if values.is_empty() => Err(DefinitionError::EmptyRestriction(axis)),
        other => Ok(other),
    }
}

fn parse_professions(names: Vec<String>) -> Result<Vec<Profession>, DefinitionError> {
    names
        .into_iter()
        .map(|name| match name.parse::<Profession>() {
            Ok(p) if p.can_trade() => Ok(p),
            _ => Err(DefinitionError::UnknownProfession(name)),
        })
        .collect()
}

fn parse_villager_types(names: Vec<String>) -> Result<Vec<VillagerType>, DefinitionError> {
    names
        .into_iter()
        .map(|name| {
            name.parse::<VillagerType>()
                .map_err(|_| DefinitionError::UnknownVillagerType(name))
        })
        .collect()
}

fn check_levels(levels: Vec<u8>) -> Result<Vec<Level>, DefinitionError> {
    match levels.iter().find(|l| !is_valid_level(**l)) {
        Some(l) => Err(DefinitionError::LevelOutOfRange(*l)),
        None => Ok(levels),
    }
}

/// Convert one raw record into a validated definition
pub fn parse_record(value: serde_json::Value) -> Result<TradeDefinition, DefinitionError> {
    let record: TradeRecord = serde_json::from_value(value)
        .map_err(|e| DefinitionError::InvalidRecord(e.to_string()))?;

    let id = record.id.ok_or(DefinitionError::MissingId)?;
    let result = record.result.ok_or(DefinitionError::MissingResult)?;
    if record.ingredients.len() > 2 {
        return Err(DefinitionError::TooManyIngredients(record.ingredients.len()));
    }
    let mut ingredients = record.ingredients.into_iter();
    let first = ingredients.next().ok_or(DefinitionError::MissingIngredients)?;

    let professions = non_empty(record.professions, Axis::Profession)?
        .map(parse_professions)
        .transpose()?;
    let villager_types = non_empty(record.villager_types, Axis::SubType)?
        .map(parse_villager_types)
        .transpose()?;
    let levels = non_empty(record.levels, Axis::Level)?
        .map(check_levels)
        .transpose()?;

    let mut trade = TradeDefinition::new(id, result.into_item()?, first.into_item()?)
        .with_max_uses(record.max_uses)
        .with_price_multiplier(record.price_multiplier)
        .with_experience(record.experience, record.give_experience_to_player)
        .with_ignore_discounts(record.ignore_discounts);
    if let Some(second) = ingredients.next() {
        trade = trade.with_second_ingredient(second.into_item()?);
    }
    if let Some(professions) = professions {
        trade = trade.restrict_professions(professions);
    }
    if let Some(types) = villager_types {
        trade = trade.restrict_sub_types(types);
    }
    if let Some(levels) = levels {
        trade = trade.restrict_levels(levels);
    }
    Ok(trade)
}

/// Load every record of a JSON document into the catalog
pub fn load_str(catalog: &mut TradeCatalog, json: &str) -> Result<LoadReport, LoadError> {
    let file: TradeFile = serde_json::from_str(json)?;

    let records = match file.trades {
        Some(records) if !records.is_empty() => records,
        _ => {
            tracing::warn!("No custom trades were found in the definition file");
            return Ok(LoadReport::default());
        }
    };

    let mut report = LoadReport {
        total: records.len(),
        ..LoadReport::default()
    };

    for (index, value) in records.into_iter().enumerate() {
        let id = value
            .get("id")
            .or_else(|| value.get("ID"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);

        let outcome = parse_record(value)
            .map_err(RecordError::from)
            .and_then(|trade| catalog.register(trade).map_err(RecordError::from));

        match outcome {
            Ok(()) => report.loaded += 1,
            Err(error) => {
                tracing::warn!(
                    index,
                    trade_id = id.as_deref().unwrap_or("<none>"),
                    %error,
                    "Skipping custom trade"
                );
                report.failures.push(RecordFailure { index, id, error });
            }
        }
    }

    tracing::info!(
        loaded = report.loaded,
        total = report.total,
        "Loaded custom trades"
    );
    Ok(report)
}

/// Load a JSON definition file into the catalog
pub fn load_file(catalog: &mut TradeCatalog, path: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
    let content = std::fs::read_to_string(path)?;
    load_str(catalog, &content)
}
