// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persistence backends for the identity mapping table.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::StoreError;

use super::IdentityMapping;

/// Durable storage for the identity mapping table.
///
/// The registry always hands the full table to [`save`](Self::save); a
/// backend only needs whole-document semantics.
pub trait MappingStore: Send {
    /// Loads the persisted table. A store that was never written returns an
    /// empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read or decoded.
    fn load(&self) -> Result<Vec<IdentityMapping>, StoreError>;

    /// Replaces the persisted table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table could not be made durable.
    fn save(&self, mappings: &[IdentityMapping]) -> Result<(), StoreError>;
}

/// In-memory store.
///
/// Clones share the same table, so a test can drop a registry, open a new
/// one on a clone of the store and observe a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Vec<IdentityMapping>>>,
    read_only: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent [`save`](MappingStore::save) fail (or succeed
    /// again).
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Returns a copy of the persisted table.
    #[must_use]
    pub fn snapshot(&self) -> Vec<IdentityMapping> {
        self.table.lock().clone()
    }
}

impl MappingStore for MemoryStore {
    fn load(&self) -> Result<Vec<IdentityMapping>, StoreError> {
        Ok(self.table.lock().clone())
    }

    fn save(&self, mappings: &[IdentityMapping]) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is read-only".to_string()));
        }
        *self.table.lock() = mappings.to_vec();
        Ok(())
    }
}

/// JSON file store.
///
/// The table is written as a JSON array of
/// `{"vDevId": .., "fibaroId": .., "order": ..}` records. Writes go to a
/// sibling temporary file which is then renamed over the target, so a crash
/// mid-write leaves the previous table intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the given file. The file does not need to
    /// exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MappingStore for JsonFileStore {
    fn load(&self) -> Result<Vec<IdentityMapping>, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No mapping file yet");
            return Ok(Vec::new());
        }
        let raw = fs::read(&self.path)?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    fn save(&self, mappings: &[IdentityMapping]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, serde_json::to_vec_pretty(mappings)?)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            entries = mappings.len(),
            "Persisted mapping table"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeviceKey, ExternalId};

    fn mapping(key: &str, id: u32) -> IdentityMapping {
        IdentityMapping {
            key: DeviceKey::new(key),
            external_id: ExternalId::new(id),
            sort_order: id,
        }
    }

    #[test]
    fn memory_store_clones_share_table() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.save(&[mapping("a", 101)]).unwrap();
        assert_eq!(other.load().unwrap(), vec![mapping("a", 101)]);
    }

    #[test]
    fn memory_store_read_only_rejects_writes() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        assert!(matches!(
            store.save(&[mapping("a", 101)]),
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn file_store_temp_path_is_sibling() {
        let store = JsonFileStore::new("/var/lib/bridge/mapping.json");
        assert_eq!(
            store.temp_path(),
            PathBuf::from("/var/lib/bridge/mapping.json.tmp")
        );
    }

    #[test]
    fn mapping_json_uses_wire_names() {
        let json = serde_json::to_value(mapping("ZWayVDev_zway_2-0-37", 101)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"vDevId": "ZWayVDev_zway_2-0-37", "fibaroId": 101, "order": 101})
        );
    }
}
