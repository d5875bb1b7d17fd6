use std::{path::PathBuf, sync::Arc};

use chrono::Local;
use clap::{Parser, Subcommand};
use reqwest::Url;

use crate::{
    api::spot_hinta,
    core::cache::DuplicateHours,
    prelude::*,
    repository::Repository,
    store::FileStore,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub repository: RepositoryArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the price of the current hour.
    Current,

    /// Print today's cheapest and most expensive hours.
    Today,

    /// Print tomorrow's cheapest and most expensive hours, once published.
    Tomorrow,

    /// Print when the next price starts.
    Next,

    /// Print the hourly prices.
    Prices(PricesArgs),

    /// Print the current price with today's and tomorrow's extremes.
    Summary,

    /// Discard the cached prices, fetch them again, and print the summary.
    Refresh,

    /// Keep printing the current price whenever the next one starts.
    Watch,
}

#[derive(Parser)]
pub struct PricesArgs {
    /// Show tomorrow's prices instead of today's.
    #[clap(long)]
    pub tomorrow: bool,
}

#[derive(Parser)]
pub struct RepositoryArgs {
    /// File to keep the fetched prices in between the runs.
    #[clap(long = "cache-path", env = "SPOT_PRICE_CACHE_PATH", default_value = "spot-price.json")]
    pub cache_path: PathBuf,

    /// spot-hinta.fi API base URL.
    #[clap(
        long = "api-base-url",
        env = "SPOT_HINTA_API_BASE_URL",
        default_value = "https://api.spot-hinta.fi/"
    )]
    pub api_base_url: Url,

    /// Which price to use when the source publishes the same hour twice.
    #[clap(
        long = "duplicate-hours",
        env = "SPOT_PRICE_DUPLICATE_HOURS",
        value_enum,
        default_value = "first"
    )]
    pub duplicate_hours: DuplicateHours,
}

impl RepositoryArgs {
    pub fn try_new_repository(&self) -> Result<Repository<Local>> {
        info!(cache_path = %self.cache_path.display(), "using the cache");
        Ok(Repository::builder()
            .source(Arc::new(spot_hinta::Api::try_new(self.api_base_url.clone())?))
            .store(Arc::new(FileStore::new(&self.cache_path)))
            .time_zone(Local)
            .duplicate_hours(self.duplicate_hours)
            .build())
    }
}
