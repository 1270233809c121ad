//! Save/load of prizes, settings and history
//!
//! Each document is stored as JSON under its own key in a `KeyValueStore`.
//! Missing keys read as "nothing stored"; corrupt documents are errors the
//! caller decides how to recover from.

pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{KeyValueStore, MemoryStore};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::history::{HistoryEntry, SpinHistoryLog};
use crate::settings::WheelSettings;
use crate::sim::PrizeSet;

/// Storage keys
pub mod keys {
    pub const PRIZES: &str = "wheel_prizes";
    pub const SETTINGS: &str = "wheel_settings";
    pub const HISTORY: &str = "wheel_history";
}

/// JSON documents over a key-value backend
pub struct Persistence {
    backend: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)
    }

    pub fn load_prizes(&self) -> Result<Option<PrizeSet>> {
        self.read(keys::PRIZES)
    }

    pub fn save_prizes(&self, prizes: &PrizeSet) -> Result<()> {
        self.write(keys::PRIZES, prizes)?;
        log::debug!("Prizes saved ({} segments)", prizes.len());
        Ok(())
    }

    /// Stored settings, sanitized
    pub fn load_settings(&self) -> Result<Option<WheelSettings>> {
        Ok(self
            .read::<WheelSettings>(keys::SETTINGS)?
            .map(WheelSettings::sanitized))
    }

    pub fn save_settings(&self, settings: &WheelSettings) -> Result<()> {
        self.write(keys::SETTINGS, settings)?;
        log::debug!("Settings saved");
        Ok(())
    }

    pub fn load_history(&self) -> Result<SpinHistoryLog> {
        let mut history = self.read::<SpinHistoryLog>(keys::HISTORY)?.unwrap_or_default();
        history.enforce_bound();
        Ok(history)
    }

    pub fn save_history(&self, history: &SpinHistoryLog) -> Result<()> {
        self.write(keys::HISTORY, history)?;
        log::debug!("History saved ({} entries)", history.len());
        Ok(())
    }

    /// Prepend one entry to the stored history
    pub fn append_history(&self, entry: &HistoryEntry) -> Result<()> {
        let mut history = self.load_history()?;
        history.record(entry.clone());
        self.save_history(&history)
    }

    pub fn clear_history(&self) -> Result<()> {
        self.backend.remove(keys::HISTORY)
    }
}
