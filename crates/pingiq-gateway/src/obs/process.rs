//! Process gauges: uptime and resident memory.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use sysinfo::{Pid, ProcessesToUpdate, System};

/// Samples this process through `sysinfo`. One instance per service.
pub struct ProcessSampler {
    started: Instant,
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ProcessSampler {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid().ok();
        if pid.is_none() {
            tracing::warn!("current pid unavailable; rss gauge will not be updated");
        }
        Self {
            started: Instant::now(),
            pid,
            system: Mutex::new(System::new()),
        }
    }

    /// Seconds since this sampler (and so the service instance) was created.
    pub fn uptime_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Resident set size in bytes.
    pub fn rss_bytes(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        system.process(pid).map(|p| p.memory())
    }
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}
