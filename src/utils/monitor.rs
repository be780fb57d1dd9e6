#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

/// Per-stage resource reporting for long ingest runs, enabled with `--monitor`.
#[cfg(feature = "cli")]
pub struct StageMonitor {
    state: Mutex<MonitorState>,
    pid: Pid,
    started: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl StageMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        let pid = sysinfo::get_current_pid().expect("Failed to get current PID");

        Self {
            state: Mutex::new(MonitorState {
                system,
                peak_memory_mb: 0,
            }),
            pid,
            started: Instant::now(),
            enabled,
        }
    }

    pub fn log_stage(&self, stage: &str) {
        if !self.enabled {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.system.refresh_all();

        let Some(process) = state.system.process(self.pid) else {
            return;
        };
        let memory_mb = process.memory() / 1024 / 1024;
        let cpu = process.cpu_usage();
        if memory_mb > state.peak_memory_mb {
            state.peak_memory_mb = memory_mb;
        }

        tracing::info!(
            "📊 {} - CPU: {:.1}%, Memory: {}MB, Elapsed: {:?}",
            stage,
            cpu,
            memory_mb,
            self.started.elapsed()
        );
    }

    pub fn log_summary(&self) {
        if !self.enabled {
            return;
        }
        let peak = self
            .state
            .lock()
            .map(|state| state.peak_memory_mb)
            .unwrap_or(0);
        tracing::info!(
            "📊 Run finished - Total Time: {:?}, Peak Memory: {}MB",
            self.started.elapsed(),
            peak
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
pub struct StageMonitor {
    enabled: bool,
}

#[cfg(not(feature = "cli"))]
impl StageMonitor {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn log_stage(&self, _stage: &str) {}

    pub fn log_summary(&self) {}

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
