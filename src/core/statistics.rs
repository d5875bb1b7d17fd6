use chrono::TimeZone;

use crate::{core::record::PriceRecord, quantity::price::CentsPerKilowattHour};

/// Cheapest and most expensive hours of a day.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DayStatistics {
    pub min_price: CentsPerKilowattHour,
    pub max_price: CentsPerKilowattHour,

    /// Local hour of the cheapest price.
    pub min_hour: u32,

    /// Local hour of the most expensive price.
    pub max_hour: u32,
}

impl DayStatistics {
    /// Find the extremes by the tax-inclusive price.
    ///
    /// On ties, the first record wins, both for the minimum and the maximum.
    pub fn from_records<'a, Tz: TimeZone>(
        records: impl IntoIterator<Item = &'a PriceRecord>,
        time_zone: &Tz,
    ) -> Option<Self> {
        let mut records = records.into_iter();
        let first = records.next()?;
        let (min, max) = records.fold((first, first), |(min, max), record| {
            (
                if record.price_including_tax < min.price_including_tax { record } else { min },
                if record.price_including_tax > max.price_including_tax { record } else { max },
            )
        });
        Some(Self {
            min_price: min.display_price(),
            max_price: max.display_price(),
            min_hour: min.local_hour(time_zone),
            max_hour: max.local_hour(time_zone),
        })
    }
}
