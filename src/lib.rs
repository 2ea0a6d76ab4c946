pub mod config;
pub mod debounce;
pub mod filters;
pub mod http_client;
pub mod leagues;
pub mod memory_store;
pub mod pagination;
pub mod postgrest;
pub mod records;
pub mod refresh;
pub mod retry;
pub mod state;
pub mod stats;
pub mod store;
pub mod worker;

use anyhow::{Context, Result};

use crate::config::StoreSource;
use crate::memory_store::MemoryStore;
use crate::store::{MatchStore, SupabaseStore};

/// Opens the configured backing store.
pub fn open_store(source: &StoreSource) -> Result<Box<dyn MatchStore + Send>> {
    match source {
        StoreSource::Remote(cfg) => {
            let store = SupabaseStore::connect(cfg.clone()).context("failed to build http client")?;
            Ok(Box::new(store))
        }
        StoreSource::Fixture(path) => Ok(Box::new(MemoryStore::from_json_file(path)?)),
    }
}
