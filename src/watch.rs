use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tokio::{signal, time::sleep};

use crate::{prelude::*, repository::Repository};

/// Do not poll more often than this, even when the next price is about to start.
const MIN_POLLING_INTERVAL: Duration = Duration::from_secs(60);

/// Poll this often when the next price is unknown.
const FALLBACK_POLLING_INTERVAL: Duration = Duration::from_secs(3600);

/// Time to wait before the next poll.
pub fn polling_interval(now: DateTime<Utc>, next_sample_at: Option<DateTime<Utc>>) -> Duration {
    next_sample_at.map_or(FALLBACK_POLLING_INTERVAL, |next_sample_at| {
        (next_sample_at - now).to_std().unwrap_or_default().max(MIN_POLLING_INTERVAL)
    })
}

/// Print the current price every time the next one starts, until interrupted.
#[instrument(skip_all)]
pub async fn watch(repository: &Repository<Local>) -> Result {
    loop {
        let now = Utc::now();
        match repository.current_price(now).await {
            Some(price) => println!("{} {price}", now.with_timezone(&Local).format("%H:%M")),
            None => println!("{} unavailable", now.with_timezone(&Local).format("%H:%M")),
        }
        let next_sample_at = repository.next_sample_at(now).await;
        let interval = polling_interval(now, next_sample_at.map(|it| it.to_utc()));
        info!(?next_sample_at, ?interval, "sleeping…");

        tokio::select! {
            () = sleep(interval) => {}
            result = signal::ctrl_c() => {
                result.context("failed to listen for Ctrl+C")?;
                info!("interrupted");
                return Ok(());
            }
        }
    }
}
