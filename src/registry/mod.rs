// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Durable mapping between internal device keys and external ids.
//!
//! Fibaro clients address devices by small integers. The registry hands
//! those out lazily, the first time a device appears in a full snapshot, and
//! keeps them forever: an id is never reused, never reassigned and never
//! deleted, even after the device disappears.
//!
//! Ids below the floor are reserved for the synthetic entries of the
//! snapshot envelope (current user, weather, registered mobile).
//!
//! # Examples
//!
//! ```
//! use fibaro_bridge::registry::{IdentityRegistry, MemoryStore};
//! use fibaro_bridge::types::DeviceKey;
//!
//! let mut registry = IdentityRegistry::open(MemoryStore::new(), 100)?;
//! let key = DeviceKey::new("ZWayVDev_zway_2-0-37");
//!
//! let mapping = registry.allocate(&key)?;
//! assert_eq!(mapping.external_id.value(), 101);
//! assert_eq!(registry.resolve(&key), Some(mapping.external_id));
//! # Ok::<(), fibaro_bridge::error::StoreError>(())
//! ```

mod store;

pub use store::{JsonFileStore, MappingStore, MemoryStore};

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::{DeviceKey, ExternalId};

/// Default id floor.
pub const DEFAULT_FLOOR: u32 = 100;

/// One row of the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMapping {
    /// Internal device key.
    #[serde(rename = "vDevId")]
    pub key: DeviceKey,
    /// External id, unique and immutable.
    #[serde(rename = "fibaroId")]
    pub external_id: ExternalId,
    /// Display order; equal to the external id at allocation time.
    #[serde(rename = "order")]
    pub sort_order: u32,
}

/// The identity registry.
///
/// Not internally synchronized: allocation reads the current maximum and then
/// writes, so callers sharing a registry must serialize access (the
/// `Bridge` keeps it behind a mutex).
pub struct IdentityRegistry {
    store: Box<dyn MappingStore>,
    floor: ExternalId,
    mappings: Vec<IdentityMapping>,
    by_key: HashMap<DeviceKey, usize>,
    by_id: HashMap<ExternalId, usize>,
}

impl IdentityRegistry {
    /// Opens a registry over the given store, loading the persisted table.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read, or
    /// `StoreError::Corrupt` if the persisted table maps a key or an id
    /// twice.
    pub fn open(store: impl MappingStore + 'static, floor: u32) -> Result<Self, StoreError> {
        let mappings = store.load()?;
        let mut by_key = HashMap::with_capacity(mappings.len());
        let mut by_id = HashMap::with_capacity(mappings.len());

        for (slot, mapping) in mappings.iter().enumerate() {
            match by_key.entry(mapping.key.clone()) {
                Entry::Occupied(_) => {
                    return Err(StoreError::Corrupt(format!(
                        "device {} is mapped twice",
                        mapping.key
                    )));
                }
                Entry::Vacant(v) => {
                    v.insert(slot);
                }
            }
            if by_id.insert(mapping.external_id, slot).is_some() {
                return Err(StoreError::Corrupt(format!(
                    "id {} is assigned twice",
                    mapping.external_id
                )));
            }
        }

        tracing::info!(entries = mappings.len(), floor, "Opened identity registry");

        Ok(Self {
            store: Box::new(store),
            floor: ExternalId::new(floor),
            mappings,
            by_key,
            by_id,
        })
    }

    /// Returns the external id of a device, if it has one.
    #[must_use]
    pub fn resolve(&self, key: &DeviceKey) -> Option<ExternalId> {
        self.mapping(key).map(|m| m.external_id)
    }

    /// Returns the full mapping of a device, if it has one.
    #[must_use]
    pub fn mapping(&self, key: &DeviceKey) -> Option<&IdentityMapping> {
        self.by_key.get(key).map(|&slot| &self.mappings[slot])
    }

    /// Reverse lookup used by the command endpoint.
    #[must_use]
    pub fn lookup_by_external_id(&self, id: ExternalId) -> Option<&DeviceKey> {
        self.by_id.get(&id).map(|&slot| &self.mappings[slot].key)
    }

    /// Assigns the next external id to a device and persists the table.
    ///
    /// The new id is `max(floor, highest id ever assigned) + 1`. A device
    /// that already has a mapping gets it back unchanged, without a write.
    ///
    /// # Errors
    ///
    /// Returns the store error if the table could not be persisted. The
    /// allocation is then undone: the registry is left exactly as it was.
    /// Returns [`StoreError::Corrupt`] once the id space is exhausted.
    pub fn allocate(&mut self, key: &DeviceKey) -> Result<IdentityMapping, StoreError> {
        if let Some(existing) = self.mapping(key) {
            return Ok(existing.clone());
        }

        let highest = self
            .mappings
            .iter()
            .map(|m| m.external_id)
            .max()
            .map_or(self.floor, |max| max.max(self.floor));
        let Some(external_id) = highest.next() else {
            tracing::warn!(device = %key, highest = %highest, "External id space exhausted");
            return Err(StoreError::Corrupt("external id space exhausted".to_string()));
        };
        let mapping = IdentityMapping {
            key: key.clone(),
            external_id,
            sort_order: external_id.value(),
        };

        self.mappings.push(mapping.clone());
        if let Err(err) = self.store.save(&self.mappings) {
            self.mappings.pop();
            tracing::warn!(device = %key, error = %err, "Failed to persist new identity");
            return Err(err);
        }

        let slot = self.mappings.len() - 1;
        self.by_key.insert(key.clone(), slot);
        self.by_id.insert(external_id, slot);

        tracing::info!(device = %key, id = %external_id, "Allocated external id");
        Ok(mapping)
    }

    /// Resolves a device, allocating an id if it has none.
    ///
    /// # Errors
    ///
    /// Returns the store error of a failed allocation.
    pub fn resolve_or_allocate(&mut self, key: &DeviceKey) -> Result<IdentityMapping, StoreError> {
        self.allocate(key)
    }

    /// Returns the id floor.
    #[must_use]
    pub fn floor(&self) -> ExternalId {
        self.floor
    }

    /// Number of mapped devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` if no device has been mapped yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Iterates over all mappings in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &IdentityMapping> {
        self.mappings.iter()
    }
}

impl std::fmt::Debug for IdentityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("floor", &self.floor)
            .field("entries", &self.mappings.len())
            .finish_non_exhaustive()
    }
}
