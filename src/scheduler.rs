//! Fixed-interval driver for the pipeline.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::pipeline::Pipeline;

/// Run one cycle now, then one per `period`, forever.
///
/// Cycles never overlap: a cycle that outlasts `period` delays the next tick
/// instead of queueing a burst.
pub async fn run_forever(pipeline: Pipeline, period: Duration) {
    run_cycles(pipeline, period, None).await;
}

/// Like [`run_forever`], stopping after `limit` cycles when given.
pub async fn run_cycles(mut pipeline: Pipeline, period: Duration, limit: Option<u64>) -> Pipeline {
    info!(every = %describe_interval(period), "Scheduler started");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycle: u64 = 0;
    while limit.map_or(true, |limit| cycle < limit) {
        ticker.tick().await;
        cycle += 1;

        let report = pipeline.run_cycle().await;
        info!(
            cycle,
            selected = report.selected,
            published = report.published,
            failed = report.failed,
            remembered = pipeline.store().len(),
            "Cycle finished"
        );
    }

    pipeline
}

/// Compact human form of an interval, e.g. `1h`, `16m`, `90s`.
#[must_use]
pub fn describe_interval(period: Duration) -> String {
    let secs = period.as_secs();
    if secs > 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}
