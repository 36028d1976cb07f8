use super::events::{EventSink, HOSTNAME_CHANGED_EVENT, HostnameChange};
use super::prober::Prober;
use super::state::{Availability, SharedState, lock};
use super::stats::FunnelStats;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Listener invoked after a hostname change. Errors are logged and do not
/// stop later listeners.
pub type HostnameCallback = Arc<dyn Fn(&HostnameChange) -> anyhow::Result<()> + Send + Sync>;

/// Ordered, non-deduplicating list of hostname listeners.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: Mutex<Vec<HostnameCallback>>,
}

impl CallbackRegistry {
    pub fn register(&self, callback: HostnameCallback) {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.push(callback);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every listener in registration order.
    pub fn notify(&self, change: &HostnameChange) {
        // Snapshot so a listener may register another without deadlocking.
        let callbacks = self
            .callbacks
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default();
        for (index, callback) in callbacks.iter().enumerate() {
            if let Err(e) = callback(change) {
                tracing::warn!(listener = index, "Hostname change listener failed: {e}");
            }
        }
    }
}

/// Periodically re-reads the agent status and propagates hostname drift.
pub struct HostnameMonitor {
    prober: Arc<Prober>,
    state: SharedState,
    callbacks: Arc<CallbackRegistry>,
    events: Arc<dyn EventSink>,
    stats: Arc<FunnelStats>,
}

impl HostnameMonitor {
    pub fn new(
        prober: Arc<Prober>,
        state: SharedState,
        callbacks: Arc<CallbackRegistry>,
        events: Arc<dyn EventSink>,
        stats: Arc<FunnelStats>,
    ) -> Self {
        Self {
            prober,
            state,
            callbacks,
            events,
            stats,
        }
    }

    /// One poll. Returns the change when one was detected and propagated.
    ///
    /// A hostname seen while the agent is marked `Unavailable` is dropped, not
    /// adopted: the unavailable verdict is sticky and carries no hostname, so
    /// `hostname()` keeps returning `None` until `reset`.
    pub async fn tick(&self) -> Option<HostnameChange> {
        let status = self.prober.read_status().await?;
        if !status.is_running() {
            tracing::debug!(backend_state = %status.backend_state, "Hostname poll skipped");
            return None;
        }
        let new_hostname = status.hostname()?;

        let change = {
            let mut state = lock(&self.state);
            let old_hostname = match state.availability.clone() {
                Availability::Available {
                    hostname: Some(old),
                } => old,
                Availability::Unavailable => {
                    tracing::debug!("Hostname poll ignored; agent marked unavailable");
                    return None;
                }
                Availability::Unknown | Availability::Available { hostname: None } => {
                    tracing::info!(hostname = %new_hostname, "Adopted agent hostname");
                    state.availability = Availability::Available {
                        hostname: Some(new_hostname),
                    };
                    return None;
                }
            };
            if old_hostname == new_hostname {
                return None;
            }

            state.availability = Availability::Available {
                hostname: Some(new_hostname.clone()),
            };
            let (active_port, public_url) = match state.active.as_mut() {
                Some(active) => {
                    active.public_url = active.public_url.replacen(&old_hostname, &new_hostname, 1);
                    (Some(active.port), Some(active.public_url.clone()))
                }
                None => (None, None),
            };
            HostnameChange {
                old_hostname,
                new_hostname,
                active_port,
                public_url,
            }
        };

        self.stats.record_hostname_change();
        tracing::info!(
            old = %change.old_hostname,
            new = %change.new_hostname,
            port = ?change.active_port,
            "Agent hostname changed"
        );

        match serde_json::to_value(&change) {
            Ok(payload) => self.events.emit(HOSTNAME_CHANGED_EVENT, payload),
            Err(e) => tracing::warn!("Failed to encode hostname change event: {e}"),
        }
        self.callbacks.notify(&change);
        Some(change)
    }

    /// Poll every `interval` until `cancel` fires. The first poll happens one
    /// interval after start.
    pub fn spawn(self: Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = self.tick() => {}
                }
            }
            tracing::debug!("Hostname monitor stopped");
        })
    }
}
