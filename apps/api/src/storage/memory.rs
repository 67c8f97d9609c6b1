use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ResumeStore, StoreError};

/// In-process slot. Used for local runs and tests; contents die with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<Option<String>>,
}

#[async_trait]
impl ResumeStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn read_raw(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.read().await.clone())
    }

    async fn write_raw(&self, value: String) -> Result<(), StoreError> {
        *self.slot.write().await = Some(value);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write().await = None;
        Ok(())
    }
}
