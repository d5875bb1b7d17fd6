use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use itertools::Itertools;
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::{
    api::price_source::PriceSource,
    core::{
        cache::{DuplicateHours, PriceCache},
        record::PriceRecord,
        statistics::DayStatistics,
    },
    prelude::*,
    quantity::price::CentsPerKilowattHour,
    store::Store,
};

/// Lazily refreshed price cache.
///
/// Every query makes sure the cache has today's prices first, fetching them when needed.
/// Failures never escape: a query answers `None` and the next one retries.
#[derive(bon::Builder)]
pub struct Repository<Tz: TimeZone> {
    source: Arc<dyn PriceSource>,
    store: Arc<dyn Store>,

    /// Time zone, in which «today», «tomorrow» and hours are reckoned.
    time_zone: Tz,

    #[builder(default)]
    duplicate_hours: DuplicateHours,

    /// Guards the entire load-check-fetch-store sequence.
    #[builder(skip)]
    refresh_lock: Arc<Mutex<()>>,
}

impl<Tz> Repository<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    /// Local date of the instant.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.time_zone).date_naive()
    }

    /// Local date following the one of the instant.
    pub fn tomorrow_of(&self, instant: DateTime<Utc>) -> Option<NaiveDate> {
        self.date_of(instant).checked_add_days(Days::new(1))
    }

    /// Tax-inclusive price of the local hour containing `now`.
    #[instrument(skip_all)]
    pub async fn current_price(&self, now: DateTime<Utc>) -> Option<CentsPerKilowattHour> {
        let now = now.with_timezone(&self.time_zone);
        self.ensure_fresh_cache(now.date_naive()).await;
        let cache = self.load_cache().await?;
        cache.at(&now, self.duplicate_hours).map(PriceRecord::display_price)
    }

    #[instrument(skip_all, fields(on = %on))]
    pub async fn day_statistics(
        &self,
        now: DateTime<Utc>,
        on: NaiveDate,
    ) -> Option<DayStatistics> {
        self.ensure_fresh_cache(self.date_of(now)).await;
        let cache = self.load_cache().await?;
        DayStatistics::from_records(cache.on(on, &self.time_zone), &self.time_zone)
    }

    pub async fn today_statistics(&self, now: DateTime<Utc>) -> Option<DayStatistics> {
        self.day_statistics(now, self.date_of(now)).await
    }

    /// Tomorrow's statistics, `None` until the source has published them.
    pub async fn tomorrow_statistics(&self, now: DateTime<Utc>) -> Option<DayStatistics> {
        let tomorrow = self.tomorrow_of(now)?;
        self.day_statistics(now, tomorrow).await
    }

    /// Timestamp of the earliest price strictly after `now`.
    #[instrument(skip_all)]
    pub async fn next_sample_at(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.ensure_fresh_cache(self.date_of(now)).await;
        let cache = self.load_cache().await?;
        cache.next_after(now).map(|record| record.local_time(&self.time_zone))
    }

    /// All prices of the local date, ordered by time.
    #[instrument(skip_all, fields(on = %on))]
    pub async fn prices_on(&self, now: DateTime<Utc>, on: NaiveDate) -> Vec<PriceRecord> {
        self.ensure_fresh_cache(self.date_of(now)).await;
        let Some(cache) = self.load_cache().await else {
            return Vec::new();
        };
        cache.on(on, &self.time_zone).cloned().sorted_by_key(|record| record.timestamp).collect()
    }

    /// Drop the cache and fetch the prices again, regardless of the freshness.
    #[instrument(skip_all)]
    pub async fn force_refresh(&self) {
        let refresher = self.refresher();
        run_detached(async move { refresher.force().await }).await;
    }

    /// Fetch the prices unless the cache already has some for `today`.
    ///
    /// Concurrent callers wait for the one in-flight refresh instead of fetching on their own.
    #[instrument(skip_all, fields(today = %today))]
    async fn ensure_fresh_cache(&self, today: NaiveDate) {
        let refresher = self.refresher();
        let time_zone = self.time_zone.clone();
        run_detached(async move { refresher.ensure_fresh(today, &time_zone).await }).await;
    }

    async fn load_cache(&self) -> Option<PriceCache> {
        load_cache(self.store.as_ref()).await
    }

    fn refresher(&self) -> Refresher {
        Refresher {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            lock: Arc::clone(&self.refresh_lock),
        }
    }
}

/// Run the refresh as a separate task, so that it completes even when the caller goes away.
async fn run_detached(refresh: impl Future<Output = ()> + Send + 'static) {
    if let Err(error) = tokio::spawn(refresh.in_current_span()).await {
        error!("the refresh task has failed: {error:#}");
    }
}

/// Owned handles to everything a refresh touches.
struct Refresher {
    source: Arc<dyn PriceSource>,
    store: Arc<dyn Store>,
    lock: Arc<Mutex<()>>,
}

impl Refresher {
    async fn ensure_fresh<Tz: TimeZone>(&self, today: NaiveDate, time_zone: &Tz) {
        let _guard = self.lock.lock().await;
        if let Some(cache) = load_cache(self.store.as_ref()).await
            && cache.is_fresh(today, time_zone)
        {
            debug!(n_records = cache.n_records(), "the cache is fresh");
            return;
        }
        info!("the cache is missing or stale, refreshing…");
        match self.try_fetch_and_save().await {
            Ok(true) => {}
            Ok(false) => clear_cache(self.store.as_ref()).await,
            Err(error) => {
                error!("failed to refresh the prices: {error:#}");
                clear_cache(self.store.as_ref()).await;
            }
        }
    }

    async fn force(&self) {
        let _guard = self.lock.lock().await;
        clear_cache(self.store.as_ref()).await;
        if let Err(error) = self.try_fetch_and_save().await {
            // The cache is already cleared.
            error!("failed to refresh the prices: {error:#}");
        }
    }

    /// Fetch the prices and store them.
    ///
    /// Returns `false` and leaves the store alone when nothing is published.
    async fn try_fetch_and_save(&self) -> Result<bool> {
        let records = self.source.fetch().await.context("failed to fetch the prices")?;
        let Some(cache) = PriceCache::new(records) else {
            warn!("no prices are published at the moment");
            return Ok(false);
        };
        info!(n_records = cache.n_records(), "storing the prices…");
        self.store.save(&cache.to_json()?).await.context("failed to store the prices")?;
        Ok(true)
    }
}

/// Load the stored cache; unreadable or corrupt ones count as missing.
async fn load_cache(store: &dyn Store) -> Option<PriceCache> {
    let blob = match store.load().await {
        Ok(blob) => blob?,
        Err(error) => {
            error!("failed to load the cache: {error:#}");
            return None;
        }
    };
    PriceCache::from_json(&blob)
        .inspect_err(|error| warn!("discarding the stored cache: {error:#}"))
        .ok()
}

async fn clear_cache(store: &dyn Store) {
    if let Err(error) = store.clear().await {
        error!("failed to clear the cache: {error:#}");
    }
}
