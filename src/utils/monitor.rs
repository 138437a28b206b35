use crate::domain::model::RunReport;
use std::time::Duration;

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[derive(Debug, Clone, Copy)]
pub struct ResourceSample {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
}

/// Logs per-phase timing for one pipeline run; process stats on CLI builds.
pub struct RunMonitor {
    enabled: bool,
    #[cfg(feature = "cli")]
    probe: Option<Mutex<ProcessProbe>>,
}

#[cfg(feature = "cli")]
struct ProcessProbe {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl ProcessProbe {
    fn new() -> Option<Self> {
        let pid = sysinfo::get_current_pid().ok()?;
        Some(Self {
            system: System::new(),
            pid,
            peak_memory_mb: 0,
        })
    }

    fn sample(&mut self) -> Option<ResourceSample> {
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        let process = self.system.process(self.pid)?;

        let memory_mb = process.memory() / 1024 / 1024;
        self.peak_memory_mb = self.peak_memory_mb.max(memory_mb);

        Some(ResourceSample {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: self.peak_memory_mb,
        })
    }
}

impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            #[cfg(feature = "cli")]
            probe: if enabled {
                ProcessProbe::new().map(Mutex::new)
            } else {
                None
            },
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    #[cfg(feature = "cli")]
    pub fn sample(&self) -> Option<ResourceSample> {
        let probe = self.probe.as_ref()?;
        probe.lock().ok()?.sample()
    }

    #[cfg(not(feature = "cli"))]
    pub fn sample(&self) -> Option<ResourceSample> {
        None
    }

    pub fn log_phase(&self, phase: &str, took: Duration) {
        if !self.enabled {
            return;
        }

        match self.sample() {
            Some(stats) => tracing::info!(
                "📊 {} took {:?} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB",
                phase,
                took,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb
            ),
            None => tracing::info!("📊 {} took {:?}", phase, took),
        }
    }

    pub fn log_final(&self, report: &RunReport) {
        if !self.enabled {
            return;
        }

        let peak = self
            .sample()
            .map(|s| format!("{}MB", s.peak_memory_mb))
            .unwrap_or_else(|| "n/a".to_string());
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Rows: {}, Skipped: {}, Written: {}, Peak Memory: {}",
            report.elapsed,
            report.rows,
            report.skipped,
            report.load.rows_written,
            peak
        );
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::disabled()
    }
}
