use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-lifetime counters for the funnel service.
pub struct FunnelStats {
    exposures_started: AtomicU64,
    exposures_stopped: AtomicU64,
    hostname_changes: AtomicU64,
    status_checks: AtomicU64,
    started_at: Instant,
    started_at_wall: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub exposures_started: u64,
    pub exposures_stopped: u64,
    pub hostname_changes: u64,
    pub status_checks: u64,
    pub started_at: String,
    pub uptime_seconds: u64,
    pub uptime: String,
}

impl FunnelStats {
    pub fn new() -> Self {
        Self {
            exposures_started: AtomicU64::new(0),
            exposures_stopped: AtomicU64::new(0),
            hostname_changes: AtomicU64::new(0),
            status_checks: AtomicU64::new(0),
            started_at: Instant::now(),
            started_at_wall: Utc::now(),
        }
    }

    pub fn record_exposure_started(&self) {
        self.exposures_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exposure_stopped(&self) {
        self.exposures_stopped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hostname_change(&self) {
        self.hostname_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_status_check(&self) {
        self.status_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let uptime = self.started_at.elapsed();
        StatsSnapshot {
            exposures_started: self.exposures_started.load(Ordering::Relaxed),
            exposures_stopped: self.exposures_stopped.load(Ordering::Relaxed),
            hostname_changes: self.hostname_changes.load(Ordering::Relaxed),
            status_checks: self.status_checks.load(Ordering::Relaxed),
            started_at: self.started_at_wall.to_rfc3339(),
            uptime_seconds: uptime.as_secs(),
            uptime: format_uptime(uptime),
        }
    }
}

/// `"1h 2m 3s"`, `"2m 3s"` or `"3s"`.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
