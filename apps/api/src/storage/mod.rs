//! Persistence of the single current resume record.
//!
//! The record lives under one fixed key as a JSON string. Backends only move
//! raw strings; decoding and the "malformed means absent" rule live here so
//! every backend behaves the same.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::resume::ResumeData;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Key the record is stored under unless `STORAGE_KEY` overrides it.
pub const DEFAULT_STORAGE_KEY: &str = "resume_data_v1";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A string key-value slot holding the serialized record.
///
/// Carried in `AppState` as `Arc<dyn ResumeStore>`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Backend name for logs.
    fn backend(&self) -> &'static str;

    async fn read_raw(&self) -> Result<Option<String>, StoreError>;

    async fn write_raw(&self, value: String) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// Loads the stored record.
///
/// Returns `Ok(None)` both when nothing is stored and when the stored value is
/// not valid JSON for a `ResumeData`; only backend failures are errors.
pub async fn load_resume(store: &dyn ResumeStore) -> Result<Option<ResumeData>, StoreError> {
    let Some(raw) = store.read_raw().await? else {
        return Ok(None);
    };
    Ok(decode_stored(&raw))
}

/// Overwrites the stored record wholesale.
pub async fn save_resume(store: &dyn ResumeStore, data: &ResumeData) -> Result<(), StoreError> {
    let raw = serde_json::to_string(data)?;
    store.write_raw(raw).await?;
    info!(
        "Saved resume ({} education, {} experience) to {} store",
        data.education.len(),
        data.experience.len(),
        store.backend()
    );
    Ok(())
}

/// Decodes a stored value, treating malformed content as absent.
pub fn decode_stored(raw: &str) -> Option<ResumeData> {
    match serde_json::from_str::<ResumeData>(raw) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("Stored resume data is malformed, treating as empty: {e}");
            None
        }
    }
}
