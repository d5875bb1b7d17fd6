use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{core::record::PriceRecord, prelude::*};

/// The last successfully fetched price window.
///
/// Never empty: an empty fetch result means «no cache».
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCache {
    prices: Vec<PriceRecord>,
}

impl PriceCache {
    /// Wrap the fetched records, or return `None` if there are none.
    pub fn new(prices: Vec<PriceRecord>) -> Option<Self> {
        if prices.is_empty() { None } else { Some(Self { prices }) }
    }

    pub const fn n_records(&self) -> usize {
        self.prices.len()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize the cache")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cache: Self = serde_json::from_str(json).context("failed to deserialize the cache")?;
        ensure!(!cache.prices.is_empty(), "the stored cache is empty");
        Ok(cache)
    }

    /// The cache is fresh when it has at least one price for `today` in the local time zone.
    ///
    /// It does not require tomorrow's prices to be present.
    pub fn is_fresh<Tz: TimeZone>(&self, today: NaiveDate, time_zone: &Tz) -> bool {
        self.prices.iter().any(|record| record.local_date(time_zone) == today)
    }

    /// Records falling on the local date, in the cache order.
    pub fn on<'a, Tz: TimeZone>(
        &'a self,
        date: NaiveDate,
        time_zone: &Tz,
    ) -> impl Iterator<Item = &'a PriceRecord> {
        self.prices.iter().filter(move |record| record.local_date(time_zone) == date)
    }

    /// Find the record covering the local hour of `now`.
    pub fn at<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        duplicate_hours: DuplicateHours,
    ) -> Option<&PriceRecord> {
        let time_zone = now.timezone();
        let (date, hour) = (now.date_naive(), now.hour());
        let mut matches =
            self.on(date, &time_zone).filter(|record| record.local_hour(&time_zone) == hour);
        match duplicate_hours {
            DuplicateHours::First => matches.next(),
            DuplicateHours::Last => matches.last(),
        }
    }

    /// The earliest record strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<&PriceRecord> {
        self.prices
            .iter()
            .filter(|record| record.timestamp.to_utc() > now)
            .min_by_key(|record| record.timestamp)
    }
}

/// Which record wins when the source publishes more than one price for the same local hour.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum DuplicateHours {
    /// The first one in the order the source has published them.
    #[default]
    First,

    /// The last one in the order the source has published them.
    Last,
}

#[cfg(test)]
mod tests {
    use chrono::{Days, FixedOffset};

    use super::*;
    use crate::{
        core::record::tests::{helsinki, record_at, some_date},
        quantity::price::KilowattHourPrice,
    };

    fn tomorrow() -> NaiveDate {
        some_date().checked_add_days(Days::new(1)).unwrap()
    }

    #[test]
    fn test_new_empty() {
        assert!(PriceCache::new(Vec::new()).is_none());
    }

    #[test]
    fn test_json_round_trip() -> Result {
        let cache = PriceCache::new(vec![
            record_at(some_date(), 0, 0.0812),
            record_at(some_date(), 1, -0.0003),
            record_at(tomorrow(), 23, 0.3141),
        ])
        .unwrap();
        let restored = PriceCache::from_json(&cache.to_json()?)?;
        assert_eq!(restored, cache);
        for (restored, original) in restored.prices.iter().zip(&cache.prices) {
            assert_eq!(restored.rank, original.rank);
            assert_eq!(restored.timestamp.offset(), original.timestamp.offset());
            assert_eq!(restored.price_including_tax, original.price_including_tax);
            assert_eq!(restored.price_excluding_tax, original.price_excluding_tax);
        }
        Ok(())
    }

    #[test]
    fn test_from_json_rejects_empty_and_garbage() {
        assert!(PriceCache::from_json(r#"{"prices":[]}"#).is_err());
        assert!(PriceCache::from_json("{").is_err());
        assert!(PriceCache::from_json("").is_err());
    }

    #[test]
    fn test_is_fresh() {
        let cache = PriceCache::new(vec![record_at(some_date(), 23, 0.10)]).unwrap();
        assert!(cache.is_fresh(some_date(), &helsinki()));
        assert!(!cache.is_fresh(tomorrow(), &helsinki()));
    }

    #[test]
    fn test_is_fresh_depends_on_time_zone() {
        // 23:00 in Helsinki is already the next day in UTC+3:
        let cache = PriceCache::new(vec![record_at(some_date(), 23, 0.10)]).unwrap();
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        assert!(!cache.is_fresh(some_date(), &moscow));
        assert!(cache.is_fresh(tomorrow(), &moscow));
    }

    #[test]
    fn test_at_picks_local_hour() {
        let cache = PriceCache::new(vec![
            record_at(tomorrow(), 13, 0.99),
            record_at(some_date(), 12, 0.10),
            record_at(some_date(), 13, 0.20),
        ])
        .unwrap();
        let now = helsinki().with_ymd_and_hms(2025, 1, 15, 13, 42, 0).unwrap();
        let record = cache.at(&now, DuplicateHours::First).unwrap();
        assert_eq!(record, &record_at(some_date(), 13, 0.20));
    }

    #[test]
    fn test_at_duplicate_hours() {
        let cache = PriceCache::new(vec![
            record_at(some_date(), 13, 0.20),
            record_at(some_date(), 13, 0.30),
        ])
        .unwrap();
        let now = helsinki().with_ymd_and_hms(2025, 1, 15, 13, 0, 0).unwrap();
        let first = cache.at(&now, DuplicateHours::First).unwrap();
        assert_eq!(first.price_including_tax, KilowattHourPrice(0.20));
        let last = cache.at(&now, DuplicateHours::Last).unwrap();
        assert_eq!(last.price_including_tax, KilowattHourPrice(0.30));
    }

    #[test]
    fn test_next_after() {
        let cache = PriceCache::new(vec![
            record_at(some_date(), 15, 0.30),
            record_at(some_date(), 13, 0.10),
            record_at(some_date(), 14, 0.20),
        ])
        .unwrap();
        let now = helsinki().with_ymd_and_hms(2025, 1, 15, 13, 0, 0).unwrap();
        assert_eq!(cache.next_after(now.to_utc()), Some(&record_at(some_date(), 14, 0.0)));
        let last = record_at(some_date(), 15, 0.30).timestamp.to_utc();
        assert_eq!(cache.next_after(last), None);
    }
}
