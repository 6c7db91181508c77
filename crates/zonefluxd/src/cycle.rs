//! One collection cycle: fetch, shape, write.

use anyhow::Context;
use tracing::{error, info, warn};

use zoneflux_core::MetricShaper;
use zoneflux_fetch::StatsFetcher;
use zoneflux_influx::MetricSink;

use crate::schedule::epoch_secs;

/// Run one fetch→shape→write pass.
///
/// A fetch miss or an empty snapshot ends the cycle quietly (the next
/// tick is the retry); a sink failure propagates and takes the process
/// down with it.
pub async fn run_cycle(
    fetcher: &StatsFetcher,
    shaper: &MetricShaper,
    sink: &MetricSink,
) -> anyhow::Result<()> {
    let Some(snapshot) = fetcher.fetch().await else {
        warn!(url = %fetcher.url(), "no snapshot this cycle, nothing forwarded");
        return Ok(());
    };

    let points = shaper.shape(&snapshot, epoch_secs());
    if points.is_empty() {
        error!(url = %fetcher.url(), "stats snapshot produced no metrics");
        return Ok(());
    }

    sink.write_points(&points)
        .await
        .context("writing points to the metrics database")?;

    info!(
        points = points.len(),
        destination = %sink.identity(),
        "metrics forwarded"
    );
    Ok(())
}
