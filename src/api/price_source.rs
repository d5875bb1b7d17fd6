use async_trait::async_trait;

use crate::{core::record::PriceRecord, prelude::*};

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current rolling window: today, and tomorrow once it is published.
    ///
    /// Connectivity and payload errors are both reported as `Err`.
    async fn fetch(&self) -> Result<Vec<PriceRecord>>;
}
