//! Key-value persistence slots.
//!
//! Every entry collection lives wholesale in one named slot. The store only
//! moves bytes; serialization and validation belong to
//! [`crate::services::entry_store`].

use std::sync::Arc;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::{Config, StoreBackend};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on slot {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Byte-oriented slot storage. Writes are last-write-wins overwrites.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Slot name for a collection inside a namespace, e.g. `moodarc:mood-entries`.
pub fn slot_key(namespace: &str, collection: &str) -> String {
    format!("{}:{}", namespace, collection)
}

pub fn create_store(config: &Config) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::open(&config.data_dir)?),
    };
    Ok(store)
}
