use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::quantity::price::{CentsPerKilowattHour, KilowattHourPrice};

/// Single hourly price sample.
#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Position of the price within its day, `1` being the cheapest hour.
    pub rank: u32,

    /// Start of the hour, with the offset it was published with.
    pub timestamp: DateTime<FixedOffset>,

    #[serde(rename = "price_excluding_tax_per_kwh")]
    pub price_excluding_tax: KilowattHourPrice,

    #[serde(rename = "price_including_tax_per_kwh")]
    pub price_including_tax: KilowattHourPrice,
}

impl PartialEq for PriceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Eq for PriceRecord {}

impl PriceRecord {
    pub fn local_time<Tz: TimeZone>(&self, time_zone: &Tz) -> DateTime<Tz> {
        self.timestamp.with_timezone(time_zone)
    }

    pub fn local_date<Tz: TimeZone>(&self, time_zone: &Tz) -> NaiveDate {
        self.local_time(time_zone).date_naive()
    }

    pub fn local_hour<Tz: TimeZone>(&self, time_zone: &Tz) -> u32 {
        self.local_time(time_zone).hour()
    }

    /// Tax-inclusive price in the display units.
    pub fn display_price(&self) -> CentsPerKilowattHour {
        self.price_including_tax.into()
    }
}

#[cfg(test)]
pub mod tests {
    use chrono::{Days, Local};

    use super::*;

    /// Eastern European Time, the source's home zone in winter.
    pub fn helsinki() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    /// Build a record at the specified local hour of the specified date.
    pub fn record_at(date: NaiveDate, hour: u32, price_including_tax: f64) -> PriceRecord {
        let timestamp =
            helsinki().from_local_datetime(&date.and_hms_opt(hour, 0, 0).unwrap()).unwrap();
        PriceRecord {
            rank: 1,
            timestamp,
            price_excluding_tax: KilowattHourPrice(price_including_tax / 1.255),
            price_including_tax: KilowattHourPrice(price_including_tax),
        }
    }

    pub fn some_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_equality_is_by_timestamp() {
        let mut other = record_at(some_date(), 3, 0.10);
        other.rank = 7;
        other.price_including_tax = KilowattHourPrice(0.99);
        assert_eq!(record_at(some_date(), 3, 0.10), other);
        assert_ne!(record_at(some_date(), 3, 0.10), record_at(some_date(), 4, 0.10));
    }

    #[test]
    fn test_local_date_crosses_midnight_in_utc() {
        // 01:00 in Helsinki is still the previous day in UTC:
        let record = record_at(some_date(), 1, 0.10);
        assert_eq!(record.local_date(&helsinki()), some_date());
        assert_eq!(
            record.local_date(&FixedOffset::east_opt(0).unwrap()),
            some_date().checked_sub_days(Days::new(1)).unwrap(),
        );
        assert_eq!(record.local_hour(&FixedOffset::east_opt(0).unwrap()), 23);
    }

    #[test]
    fn test_local_time_keeps_instant() {
        let record = record_at(some_date(), 12, 0.10);
        assert_eq!(record.local_time(&Local), record.timestamp);
    }

    #[test]
    fn test_deserialize_ok() -> crate::prelude::Result {
        let record: PriceRecord = serde_json::from_str(
            r#"{"rank":3,"timestamp":"2025-01-15T12:00:00+02:00","price_excluding_tax_per_kwh":0.1,"price_including_tax_per_kwh":0.1255}"#,
        )?;
        assert_eq!(record.rank, 3);
        assert_eq!(record.local_hour(&helsinki()), 12);
        assert_eq!(record.timestamp.offset(), &helsinki());
        Ok(())
    }
}
