//! Drives ingestion cycles.
//!
//! Two modes share the same cycle:
//! - continuous: run now, sleep, repeat until told to stop
//! - on demand: run exactly once per external trigger

use std::future::Future;
use std::time::Duration;

use tracing::{error, info};

use crate::analysis::RankingAnalyzer;
use crate::ingest::{CycleError, CycleReport, IngestionCycle, StationFeed};
use crate::report::format_ranking_table;
use crate::store::StoreError;

/// Default pause between cycles in continuous mode.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Owns the loop around an [`IngestionCycle`].
#[derive(Debug)]
pub struct Scheduler<F> {
    cycle: IngestionCycle<F>,
    analyzer: RankingAnalyzer,
    interval: Duration,
    ranking_limit: usize,
}

impl<F: StationFeed> Scheduler<F> {
    pub fn new(
        cycle: IngestionCycle<F>,
        analyzer: RankingAnalyzer,
        interval: Duration,
        ranking_limit: usize,
    ) -> Self {
        Self {
            cycle,
            analyzer,
            interval,
            ranking_limit,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single cycle for an external caller.
    ///
    /// The outcome is returned as-is; stored data is untouched on failure.
    pub async fn trigger(&self) -> Result<CycleReport, CycleError> {
        self.cycle.run_once().await
    }

    /// Run cycles until `shutdown` completes.
    ///
    /// The first cycle starts immediately. `shutdown` is only observed
    /// between cycles: an in-progress cycle always finishes, and a shutdown
    /// that completed during it stops the loop before the next sleep. Failed
    /// cycles are logged and the loop carries on. Returns the number of
    /// cycles run.
    pub async fn run_continuous(&self, shutdown: impl Future<Output = ()>) -> u64 {
        tokio::pin!(shutdown);
        let mut cycles = 0;

        loop {
            cycles += 1;
            info!(cycle = cycles, "starting ingestion cycle");

            match self.cycle.run_once().await {
                Ok(report) => info!(
                    cycle = cycles,
                    inserted = report.inserted,
                    snapshot_time = %report.snapshot_time,
                    "ingestion cycle succeeded"
                ),
                Err(e) => error!(cycle = cycles, error = %e, "ingestion cycle failed"),
            }

            self.log_report().await;

            info!(
                cycle = cycles,
                sleep_secs = self.interval.as_secs(),
                "cycle finished; sleeping"
            );

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(cycles, "collection stopped");
        cycles
    }

    /// Log network totals and the ranking after a cycle.
    async fn log_report(&self) {
        let analyzer = self.analyzer.clone();
        let limit = self.ranking_limit;

        let report = tokio::task::spawn_blocking(move || -> Result<_, StoreError> {
            Ok((analyzer.summarize_latest()?, analyzer.compute_ranking(limit)?))
        })
        .await;

        match report {
            Ok(Ok((summary, ranking))) => {
                if let Some(s) = summary {
                    info!(
                        stations = s.station_count,
                        bikes = s.total_bikes,
                        docks = s.total_docks,
                        "network totals"
                    );
                }
                info!("ranking after cycle:\n{}", format_ranking_table(&ranking));
            }
            Ok(Err(e)) => error!(error = %e, "ranking analysis failed"),
            Err(e) => error!(error = %e, "ranking worker failed"),
        }
    }
}
