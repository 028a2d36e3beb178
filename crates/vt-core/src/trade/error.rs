//! Error types for the trade catalog and its loader

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use super::TradeId;

/// Restriction axis of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Axis {
    Profession,
    SubType,
    Level,
}

/// Registration errors. A failed call never mutates the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("trade '{0}' is already registered")]
    DuplicateId(TradeId),

    #[error("no trade registered under '{0}'")]
    UnknownTrade(TradeId),

    #[error("trade '{id}' has an empty {axis} restriction and could never be offered")]
    EmptyRestriction { id: TradeId, axis: Axis },

    #[error("trade '{id}' names {axis} value {value}, which is not indexed")]
    Unindexed {
        id: TradeId,
        axis: Axis,
        value: String,
    },
}

/// A definition record that cannot become a [`super::TradeDefinition`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("record has no trade id")]
    MissingId,

    #[error("trade result is missing")]
    MissingResult,

    #[error("trade has no ingredients")]
    MissingIngredients,

    #[error("trade has {0} ingredients, at most 2 are allowed")]
    TooManyIngredients(usize),

    #[error("unknown profession: {0}")]
    UnknownProfession(String),

    #[error("unknown villager type: {0}")]
    UnknownVillagerType(String),

    #[error("level {0} is outside 1..=5")]
    LevelOutOfRange(u8),

    #[error("explicit {0} restriction is empty")]
    EmptyRestriction(Axis),

    #[error("incorrect enchantment key: {0}")]
    InvalidEnchantment(String),

    #[error("attribute modifier operation must be one of ADD | MULTIPLY | MULTIPLY_ALL_MODIFIERS, got {0}")]
    InvalidOperation(String),

    #[error("invalid record format: {0}")]
    InvalidRecord(String),
}

/// Why a single record was skipped during a load
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Malformed(#[from] DefinitionError),

    #[error(transparent)]
    Rejected(#[from] CatalogError),
}

/// Errors that abort a whole load
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
