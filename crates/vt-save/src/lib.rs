//! vt-save: persistent storage for villager trade ledgers
//!
//! A ledger file is JSON with a versioned header followed by the granted
//! trades of every villager. [`FileLedger`] keeps the ledger in memory and
//! writes it back on [`FileLedger::flush`].

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vt_core::{InstanceTradeLedger, MemoryLedger, TradeId, VillagerId};

/// Current ledger file format version
pub const LEDGER_VERSION: u32 = 1;

/// Ledger storage errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Ledger file not found")]
    NotFound,

    #[error("Incompatible ledger version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("Invalid ledger file header")]
    InvalidHeader,
}

/// Ledger file header for versioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerHeader {
    /// Magic identifier
    pub magic: String,
    /// Ledger format version
    pub version: u32,
    /// Villagers with at least one granted trade
    pub villagers: usize,
    /// Timestamp of save
    pub timestamp: u64,
}

impl LedgerHeader {
    const MAGIC: &'static str = "VTLG";

    pub fn new(ledger: &MemoryLedger) -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: LEDGER_VERSION,
            villagers: ledger.villager_count(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.magic != Self::MAGIC {
            return Err(SaveError::InvalidHeader);
        }
        if self.version != LEDGER_VERSION {
            return Err(SaveError::IncompatibleVersion {
                expected: LEDGER_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

/// Complete ledger file structure
#[derive(Serialize, Deserialize)]
struct LedgerFile {
    header: LedgerHeader,
    ledger: MemoryLedger,
}

/// Borrowing twin of [`LedgerFile`] so saving does not clone the ledger
#[derive(Serialize)]
struct LedgerFileRef<'a> {
    header: LedgerHeader,
    ledger: &'a MemoryLedger,
}

/// Save a ledger to a file
pub fn save_ledger(ledger: &MemoryLedger, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let ledger_file = LedgerFileRef {
        header: LedgerHeader::new(ledger),
        ledger,
    };
    serde_json::to_writer_pretty(writer, &ledger_file)?;

    tracing::debug!(path = %path.display(), villagers = ledger.villager_count(), "Saved trade ledger");
    Ok(())
}

/// Open a ledger file for reading; only a missing file maps to `NotFound`
fn open_ledger_file(path: &Path) -> Result<File, SaveError> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SaveError::NotFound,
        _ => SaveError::Io(e),
    })
}

/// Load a ledger from a file
pub fn load_ledger(path: impl AsRef<Path>) -> Result<MemoryLedger, SaveError> {
    let file = open_ledger_file(path.as_ref())?;
    let reader = BufReader::new(file);
    let ledger_file: LedgerFile = serde_json::from_reader(reader)?;

    ledger_file.header.validate()?;
    Ok(ledger_file.ledger)
}

/// Load only the header from a ledger file
pub fn load_header(path: impl AsRef<Path>) -> Result<LedgerHeader, SaveError> {
    let file = open_ledger_file(path.as_ref())?;
    let reader = BufReader::new(file);
    let ledger_file: LedgerFile = serde_json::from_reader(reader)?;
    ledger_file.header.validate()?;
    Ok(ledger_file.header)
}

/// Check if a ledger file exists
pub fn ledger_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Delete a ledger file
pub fn delete_ledger(path: impl AsRef<Path>) -> Result<(), SaveError> {
    std::fs::remove_file(path)?;
    Ok(())
}

/// Get the default ledger path for a world name
pub fn default_ledger_path(world: &str) -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("villager-trades");
    path.push("ledgers");
    path.push(format!("{}.json", world));
    path
}

/// Ledger backed by a file
///
/// Changes stay in memory until [`FileLedger::flush`] is called.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    ledger: MemoryLedger,
    dirty: bool,
}

impl FileLedger {
    /// Open a ledger file; a missing file starts an empty ledger
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let path = path.into();
        let ledger = if ledger_exists(&path) {
            load_ledger(&path)?
        } else {
            tracing::debug!(path = %path.display(), "No ledger file yet, starting empty");
            MemoryLedger::new()
        };

        Ok(Self {
            path,
            ledger,
            dirty: false,
        })
    }

    /// Write the ledger back if anything changed since the last flush
    pub fn flush(&mut self) -> Result<(), SaveError> {
        if !self.dirty {
            return Ok(());
        }
        save_ledger(&self.ledger, &self.path)?;
        self.dirty = false;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    /// Check if there are changes not yet written
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl InstanceTradeLedger for FileLedger {
    fn granted(&self, villager: &VillagerId) -> &[TradeId] {
        self.ledger.granted(villager)
    }

    fn append(&mut self, villager: &VillagerId, id: TradeId) {
        self.ledger.append(villager, id);
        self.dirty = true;
    }

    fn clear(&mut self, villager: &VillagerId) {
        if !self.ledger.granted(villager).is_empty() {
            self.dirty = true;
        }
        self.ledger.clear(villager);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryLedger {
        let mut ledger = MemoryLedger::new();
        let villager = VillagerId::new("2b1c7f3e-villager");
        ledger.append(&villager, TradeId::new("bread"));
        ledger.append(&villager, TradeId::new("cake"));
        ledger
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("vt_test_ledger.json");

        let ledger = sample();
        save_ledger(&ledger, &path).unwrap();
        assert!(ledger_exists(&path));

        let loaded = load_ledger(&path).unwrap();
        assert_eq!(loaded, ledger);
        assert_eq!(load_header(&path).unwrap().villagers, 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_header_validation() {
        let header = LedgerHeader::new(&sample());
        assert!(header.validate().is_ok());

        let mut bad_header = header.clone();
        bad_header.magic = "NHRS".to_string();
        assert!(matches!(bad_header.validate(), Err(SaveError::InvalidHeader)));

        let mut old_header = header;
        old_header.version = 999;
        assert!(matches!(
            old_header.validate(),
            Err(SaveError::IncompatibleVersion {
                expected: LEDGER_VERSION,
                found: 999
            })
        ));
    }

    #[test]
    fn test_load_nonexistent() {
        let result = load_ledger("/nonexistent/path/ledger.json");
        assert!(matches!(result, Err(SaveError::NotFound)));
        assert!(matches!(
            load_header("/nonexistent/path/ledger.json"),
            Err(SaveError::NotFound)
        ));
    }

    #[test]
    fn test_unreadable_path_is_not_reported_missing() {
        // A directory exists, so whatever fails it is not a missing file.
        let dir = std::env::temp_dir();
        assert!(!matches!(load_ledger(&dir), Err(SaveError::NotFound)));
        assert!(!matches!(load_header(&dir), Err(SaveError::NotFound)));
        assert!(load_ledger(&dir).is_err());
    }

    #[test]
    fn test_load_garbage() {
        let path = std::env::temp_dir().join("vt_test_ledger_garbage.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(load_ledger(&path), Err(SaveError::Serialization(_))));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_ledger_missing_file_is_empty() {
        let path = std::env::temp_dir().join("vt_test_ledger_missing.json");
        std::fs::remove_file(&path).ok();

        let mut ledger = FileLedger::open(&path).unwrap();
        assert_eq!(ledger.ledger().villager_count(), 0);
        assert!(!ledger.is_dirty());

        ledger.flush().unwrap();
        assert!(!ledger_exists(&path));
    }

    #[test]
    fn test_file_ledger_flush_persists() {
        let path = std::env::temp_dir().join("vt_test_file_ledger.json");
        std::fs::remove_file(&path).ok();
        let villager = VillagerId::new("v1");

        let mut ledger = FileLedger::open(&path).unwrap();
        ledger.append(&villager, TradeId::new("bread"));
        assert!(ledger.is_dirty());
        ledger.flush().unwrap();
        assert!(!ledger.is_dirty());

        let mut reopened = FileLedger::open(&path).unwrap();
        assert!(reopened.contains(&villager, &TradeId::new("bread")));

        reopened.clear(&villager);
        reopened.flush().unwrap();
        assert!(FileLedger::open(&path).unwrap().granted(&villager).is_empty());

        delete_ledger(&path).unwrap();
        assert!(!ledger_exists(&path));
    }

    #[test]
    fn test_default_ledger_path() {
        let path = default_ledger_path("world");
        assert!(path.ends_with("villager-trades/ledgers/world.json"));
    }
}
