mod file;
#[cfg(test)]
mod memory;

use async_trait::async_trait;

#[cfg(test)]
pub use self::memory::MemoryStore;
pub use self::file::FileStore;
use crate::prelude::*;

/// Durable storage of the single serialized cache blob.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load the blob, `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<String>>;

    /// Replace the blob.
    async fn save(&self, blob: &str) -> Result;

    /// Remove the blob. Clearing an empty store is fine.
    async fn clear(&self) -> Result;
}
