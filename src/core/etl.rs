use crate::core::{Pipeline, RunReport};
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;
use std::time::Instant;
use tracing::Instrument;

/// Runs extract, transform and load strictly in sequence.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// `true` when all three steps completed without an error.
    ///
    /// Errors are logged here and never escape. A load failure that the
    /// pipeline swallowed still counts as success.
    pub async fn run(&self) -> bool {
        match self.try_run().await {
            Ok(report) => {
                if let Some(failure) = &report.load.failure {
                    tracing::warn!(
                        "ETL finished but the load step reported a failure: {}",
                        failure
                    );
                }
                tracing::info!(
                    "✅ ETL finished its process correctly: {} rows, {} skipped, {} written in {:?}",
                    report.rows,
                    report.skipped,
                    report.load.rows_written,
                    report.elapsed
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    severity = ?e.severity(),
                    "❌ ETL process failed: {}",
                    e
                );
                false
            }
        }
    }

    /// Same sequence as [`EtlEngine::run`], returning the typed outcome.
    pub async fn try_run(&self) -> Result<RunReport> {
        let span = tracing::info_span!("asteroid_etl", start_date = %self.pipeline.start_date());
        self.run_steps().instrument(span).await
    }

    async fn run_steps(&self) -> Result<RunReport> {
        let started = Instant::now();
        tracing::info!("Starting ETL process...");

        // Extract
        let phase = Instant::now();
        let raw = self.pipeline.extract().await?;
        if let Some(count) = raw.element_count() {
            tracing::info!("Extracted feed with {} objects", count);
        }
        self.monitor.log_phase("Extract", phase.elapsed());

        // Transform
        let phase = Instant::now();
        let table = self.pipeline.transform(raw).await?;
        let (rows, skipped) = (table.len(), table.skipped());
        tracing::info!("Transformed {} records ({} skipped)", rows, skipped);
        self.monitor.log_phase("Transform", phase.elapsed());

        // Load
        let phase = Instant::now();
        let load = self.pipeline.load(table).await?;
        self.monitor.log_phase("Load", phase.elapsed());

        let report = RunReport {
            start_date: self.pipeline.start_date().to_string(),
            rows,
            skipped,
            load,
            elapsed: started.elapsed(),
        };
        self.monitor.log_final(&report);

        Ok(report)
    }
}
