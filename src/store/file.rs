use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{prelude::*, store::Store};

/// Keeps the blob in a single file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temporary_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".tmp");
        path.into()
    }
}

#[async_trait]
impl Store for FileStore {
    #[instrument(skip_all, level = Level::DEBUG, fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => {
                Err(error).with_context(|| format!("failed to read `{}`", self.path.display()))
            }
        }
    }

    #[instrument(skip_all, fields(path = %self.path.display(), len = blob.len()))]
    async fn save(&self, blob: &str) -> Result {
        // Rename is atomic, so readers see either the old or the new blob:
        let temporary_path = self.temporary_path();
        fs::write(&temporary_path, blob)
            .await
            .with_context(|| format!("failed to write `{}`", temporary_path.display()))?;
        fs::rename(&temporary_path, &self.path)
            .await
            .with_context(|| format!("failed to replace `{}`", self.path.display()))?;
        debug!("saved");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn clear(&self) -> Result {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("cleared");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => {
                Err(error).with_context(|| format!("failed to remove `{}`", self.path.display()))
            }
        }
    }
}
