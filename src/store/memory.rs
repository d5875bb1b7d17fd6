use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{prelude::*, store::Store};

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
    n_saves: AtomicUsize,
    n_clears: AtomicUsize,
}

impl MemoryStore {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self { blob: Mutex::new(Some(blob.into())), ..Self::default() }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().unwrap().clone()
    }

    pub fn n_saves(&self) -> usize {
        self.n_saves.load(Ordering::SeqCst)
    }

    pub fn n_clears(&self) -> usize {
        self.n_clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.blob())
    }

    async fn save(&self, blob: &str) -> Result {
        self.n_saves.fetch_add(1, Ordering::SeqCst);
        *self.blob.lock().unwrap() = Some(blob.to_owned());
        Ok(())
    }

    async fn clear(&self) -> Result {
        self.n_clears.fetch_add(1, Ordering::SeqCst);
        *self.blob.lock().unwrap() = None;
        Ok(())
    }
}
