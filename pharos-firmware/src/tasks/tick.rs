//! Tick task for time-based protocol upkeep
//!
//! Drives the command link's idle timer so an addressed-but-never-
//! terminated command cannot hold the link in accumulation forever.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::tasks::bus::with_link;

/// Tick task - periodic cadence for the link's idle timeout
#[embassy_executor::task]
pub async fn tick_task(interval_ms: u32) {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms as u64));

    loop {
        ticker.next().await;
        with_link(|link| link.tick());
    }
}
