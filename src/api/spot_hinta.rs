//! [spot-hinta.fi](https://spot-hinta.fi) client.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    api::{client, price_source::PriceSource},
    core::record::PriceRecord,
    prelude::*,
    quantity::price::KilowattHourPrice,
};

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    /// Hourly prices; the source also offers 15-minute ones.
    const PRICE_RESOLUTION_MINUTES: u32 = 60;

    pub fn try_new(base_url: Url) -> Result<Self> {
        Ok(Self { client: client::try_new()?, base_url })
    }

    fn endpoint(&self) -> Result<Url> {
        self.base_url
            .join("TodayAndDayForward")
            .with_context(|| format!("invalid base URL: `{}`", self.base_url))
    }

    fn parse(body: &str) -> Result<Vec<PriceRecord>> {
        Ok(serde_json::from_str::<Vec<SpotPrice>>(body)
            .context("failed to deserialize the response")?
            .into_iter()
            .map(PriceRecord::from)
            .collect())
    }
}

#[async_trait]
impl PriceSource for Api {
    #[instrument(skip_all)]
    async fn fetch(&self) -> Result<Vec<PriceRecord>> {
        let url = self.endpoint()?;
        info!(%url, "fetching…");
        let body = self
            .client
            .get(url)
            .query(&[("priceResolution", Self::PRICE_RESOLUTION_MINUTES)])
            .send()
            .await
            .context("failed to call")?
            .error_for_status()
            .context("request failed")?
            .text()
            .await
            .context("failed to read the response")?;
        let records = Self::parse(&body)?;
        info!(n_records = records.len(), "fetched");
        Ok(records)
    }
}

#[derive(Deserialize)]
struct SpotPrice {
    #[serde(rename = "Rank")]
    rank: u32,

    #[serde(rename = "DateTime")]
    date_time: DateTime<FixedOffset>,

    /// Euro per kilowatt-hour.
    #[serde(rename = "PriceNoTax")]
    price_no_tax: f64,

    /// Euro per kilowatt-hour, including VAT.
    #[serde(rename = "PriceWithTax")]
    price_with_tax: f64,
}

impl From<SpotPrice> for PriceRecord {
    fn from(price: SpotPrice) -> Self {
        Self {
            rank: price.rank,
            timestamp: price.date_time,
            price_excluding_tax: KilowattHourPrice(price.price_no_tax),
            price_including_tax: KilowattHourPrice(price.price_with_tax),
        }
    }
}
