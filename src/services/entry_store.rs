//! Entry Store Adapter: one collection, one slot, wholesale read/write.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::db::{slot_key, KeyValueStore, StoreError};
use crate::models::entry::{Entry, ItemValidation};

pub struct EntryStore<E> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    // Held across load, merge and save so concurrent writers never drop
    // each other's changes. Shared by every clone of the adapter.
    write_lock: Arc<Mutex<()>>,
    _entry: PhantomData<fn() -> E>,
}

impl<E> Clone for EntryStore<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
            write_lock: self.write_lock.clone(),
            _entry: PhantomData,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub total_after: usize,
}

impl<E: Entry> EntryStore<E> {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: &str) -> Self {
        Self {
            store,
            key: slot_key(namespace, E::COLLECTION),
            write_lock: Arc::new(Mutex::new(())),
            _entry: PhantomData,
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }

    #[cfg(test)]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the whole collection. Missing or unreadable data is an empty
    /// collection, never an error.
    pub fn load(&self) -> Vec<E> {
        let bytes = match self.store.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read entry slot");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<E>>(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Corrupt entry slot, treating as empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the slot with `entries`, sorted by date descending.
    pub fn save(&self, entries: &mut [E]) -> Result<(), StoreError> {
        sort_newest_first(entries);
        let bytes = serde_json::to_vec(entries)?;
        self.store.set(&self.key, &bytes)?;
        tracing::debug!(key = %self.key, count = entries.len(), "Entry slot saved");
        Ok(())
    }

    /// Insert or update one entry and persist. Returns the stored record.
    pub fn upsert(&self, entry: E, now: DateTime<Utc>) -> Result<E, StoreError> {
        let _guard = self.lock_writes()?;
        let mut entries = self.load();
        let stored = merge_entry(&mut entries, entry, now);
        self.save(&mut entries)?;
        Ok(stored)
    }

    /// Remove by id. Deleting an unknown id is not an error.
    pub fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let _guard = self.lock_writes()?;
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|e| e.id() != id);
        let removed = entries.len() != before;
        if removed {
            self.save(&mut entries)?;
        }
        Ok(removed)
    }

    /// Merge a validated import batch, item by item, then persist once.
    pub fn import(&self, items: Vec<E>, now: DateTime<Utc>) -> Result<ImportOutcome, StoreError> {
        let _guard = self.lock_writes()?;
        let mut entries = self.load();
        let imported = items.len();
        for item in items {
            merge_entry(&mut entries, item, now);
        }
        self.save(&mut entries)?;
        Ok(ImportOutcome {
            imported,
            total_after: entries.len(),
        })
    }
}

pub fn sort_newest_first<E: Entry>(entries: &mut [E]) {
    entries.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// Apply the id-or-date merge rule.
///
/// A record with the same date is updated in place even when the ids differ.
/// Otherwise a record with the same id is updated (the entry moved to a new
/// date). When the id matched a different record than the date did, that
/// record is dropped so each date still holds one entry.
pub fn merge_entry<E: Entry>(entries: &mut Vec<E>, mut incoming: E, now: DateTime<Utc>) -> E {
    let by_date = entries.iter().position(|e| e.date() == incoming.date());
    let by_id = entries.iter().position(|e| e.id() == incoming.id());

    let Some(target) = by_date.or(by_id) else {
        entries.push(incoming.clone());
        return incoming;
    };

    let existing = &entries[target];
    incoming.restamp(existing.id(), existing.created_at(), now);
    entries[target] = incoming.clone();

    if let Some(stale) = by_id.filter(|&i| i != target) {
        entries.remove(stale);
    }
    incoming
}

/// Validate an arbitrary parsed payload. `None` unless it is an array
/// holding at least one valid item; invalid items are skipped.
pub fn validate_import<E: Entry>(data: &Value, now: DateTime<Utc>) -> Option<Vec<E>> {
    let items = data.as_array()?;
    let valid: Vec<E> = items
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match E::from_import(raw, now) {
            ItemValidation::Valid(entry) => Some(entry),
            ItemValidation::Invalid(reason) => {
                tracing::debug!(index, reason = %reason, "Skipping invalid import item");
                None
            }
        })
        .collect();

    if valid.is_empty() {
        return None;
    }
    Some(valid)
}
