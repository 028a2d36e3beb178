//! Trade options and configuration file
//!
//! Uses an rc-file layout: `OPTIONS=` lines with comma separated
//! entries, `!` or `no` for negation and `name:value` pairs, plus a
//! `TRADES=` line naming the definition file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default name of the trade definition file
pub const DEFAULT_TRADES_FILE: &str = "trades.json";

/// User-configurable trade options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOptions {
    /// Replace vanilla offers with custom trades
    pub custom_trades: bool,
    /// Let cartographers keep their vanilla explorer map offers
    pub vanilla_cartographer_maps: bool,
    /// Trade definition file
    pub trades: PathBuf,
}

impl Default for TradeOptions {
    fn default() -> Self {
        Self {
            custom_trades: true,
            vanilla_cartographer_maps: true,
            trades: PathBuf::from(DEFAULT_TRADES_FILE),
        }
    }
}

impl TradeOptions {
    /// Load options from a file
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::Io(e.to_string()))?;

        Self::parse_config(&contents)
    }

    /// Parse options from a config string
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for line in contents.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(opts) = line.strip_prefix("OPTIONS=") {
                for opt in opts.split(',') {
                    options.parse_option(opt.trim())?;
                }
            } else if let Some(path) = line.strip_prefix("TRADES=") {
                options.set_option("trades", Some(path.trim()))?;
            } else {
                return Err(OptionsError::Parse(line.to_string()));
            }
        }

        Ok(options)
    }

    /// Parse a single option
    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if opt.is_empty() {
            return Ok(());
        }

        if let Some((key, value)) = opt.split_once(':') {
            return self.set_option(key.trim(), Some(value.trim()));
        }
        if let Some((key, value)) = opt.split_once('=') {
            return self.set_option(key.trim(), Some(value.trim()));
        }

        let (negated, name) = if let Some(name) = opt.strip_prefix('!') {
            (true, name)
        } else if let Some(name) = opt.strip_prefix("no") {
            (true, name)
        } else {
            (false, opt)
        };

        self.set_bool_option(name, !negated)
    }

    fn set_bool_option(&mut self, name: &str, value: bool) -> Result<(), OptionsError> {
        match name {
            "custom_trades" => self.custom_trades = value,
            "vanilla_cartographer_maps" => self.vanilla_cartographer_maps = value,
            "trades" => return Err(OptionsError::MissingValue(name.to_string())),
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), OptionsError> {
        let value = value.ok_or_else(|| OptionsError::MissingValue(name.to_string()))?;

        match name {
            "trades" => {
                if value.is_empty() {
                    return Err(OptionsError::MissingValue(name.to_string()));
                }
                self.trades = PathBuf::from(value);
            }
            "custom_trades" => self.custom_trades = parse_bool(name, value)?,
            "vanilla_cartographer_maps" => {
                self.vanilla_cartographer_maps = parse_bool(name, value)?;
            }
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Save options to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), OptionsError> {
        let contents = self.to_config_string();
        std::fs::write(path, contents).map_err(|e| OptionsError::Io(e.to_string()))
    }

    /// Convert options to config file format
    pub fn to_config_string(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# villager-trades configuration file".to_string());
        lines.push(String::new());

        lines.push(format!(
            "OPTIONS={}",
            if self.custom_trades {
                "custom_trades"
            } else {
                "!custom_trades"
            }
        ));
        lines.push(format!(
            "OPTIONS={}",
            if self.vanilla_cartographer_maps {
                "vanilla_cartographer_maps"
            } else {
                "!vanilla_cartographer_maps"
            }
        ));

        lines.push(String::new());
        lines.push("# Trade definitions".to_string());
        lines.push(format!("TRADES={}", self.trades.display()));

        lines.join("\n")
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, OptionsError> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(OptionsError::InvalidValue(
            name.to_string(),
            value.to_string(),
        )),
    }
}

/// Options parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: unrecognized line '{0}'")]
    Parse(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid value '{1}' for option '{0}'")]
    InvalidValue(String, String),

    #[error("Missing value for option '{0}'")]
    MissingValue(String),
}
