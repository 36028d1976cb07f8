use super::controller::{FunnelController, FunnelStatus};
use super::events::EventSink;
use super::monitor::{CallbackRegistry, HostnameCallback, HostnameMonitor};
use super::prober::Prober;
use super::state::{ActiveFunnel, SharedState, lock, new_shared_state};
use super::stats::{FunnelStats, StatsSnapshot};
use super::traits::AgentRunner;
use crate::config::{Config, ExposeSpec};
use crate::plugins::ExtensionRegistry;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Slot name under which the funnel API is registered.
pub const FUNNEL_EXTENSION: &str = "funnel";

pub type FunnelFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Funnel operations offered to other in-process consumers.
///
/// Nothing here fails loudly: unavailability and agent errors surface as
/// `None` / `false`.
pub trait FunnelApi: Send + Sync {
    /// Cached availability verdict; never probes.
    fn is_available(&self) -> bool;

    /// Cached hostname, probing once if unknown.
    fn hostname(&self) -> FunnelFuture<'_, Option<String>>;

    /// Expose `port` under `path` (default `/`). Returns the public URL.
    fn expose<'a>(&'a self, port: u16, path: Option<&'a str>) -> FunnelFuture<'a, Option<String>>;

    /// Stop exposing `port`. False when it was not the active exposure.
    fn unexpose(&self, port: u16) -> FunnelFuture<'_, bool>;

    fn url(&self, port: u16) -> Option<String>;

    fn status(&self) -> FunnelStatus;

    fn on_hostname_change(&self, callback: HostnameCallback);

    fn port(&self) -> Option<u16>;
}

/// Lifecycle owner for the prober, controller and monitor.
pub struct FunnelService {
    config: Config,
    state: SharedState,
    prober: Arc<Prober>,
    controller: FunnelController,
    monitor: Arc<HostnameMonitor>,
    callbacks: Arc<CallbackRegistry>,
    stats: Arc<FunnelStats>,
    registry: Arc<ExtensionRegistry>,
    cancel: CancellationToken,
    monitor_task: Mutex<Option<JoinHandle<()>>>,
    registered: AtomicBool,
    shut_down: AtomicBool,
}

impl FunnelService {
    /// Wire the components without touching the agent.
    pub fn new(
        config: Config,
        runner: Arc<dyn AgentRunner>,
        events: Arc<dyn EventSink>,
        registry: Arc<ExtensionRegistry>,
    ) -> Arc<Self> {
        let state = new_shared_state();
        let stats = Arc::new(FunnelStats::new());
        let timeout = Duration::from_secs(config.command_timeout_secs.max(1));
        let prober = Arc::new(Prober::new(
            Arc::clone(&runner),
            Arc::clone(&state),
            Arc::clone(&stats),
            timeout,
        ));
        let controller = FunnelController::new(
            runner,
            Arc::clone(&prober),
            Arc::clone(&state),
            Arc::clone(&stats),
            timeout,
        );
        let callbacks = Arc::new(CallbackRegistry::default());
        let monitor = Arc::new(HostnameMonitor::new(
            Arc::clone(&prober),
            Arc::clone(&state),
            Arc::clone(&callbacks),
            events,
            Arc::clone(&stats),
        ));

        Arc::new(Self {
            config,
            state,
            prober,
            controller,
            monitor,
            callbacks,
            stats,
            registry,
            cancel: CancellationToken::new(),
            monitor_task: Mutex::new(None),
            registered: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Build the service, probe the agent, register the extension, honor the
    /// configured auto-expose and start the hostname monitor.
    ///
    /// With `enabled = false` the service is returned inert: unregistered and
    /// never probed.
    pub async fn init(
        config: Config,
        runner: Arc<dyn AgentRunner>,
        events: Arc<dyn EventSink>,
        registry: Arc<ExtensionRegistry>,
    ) -> Arc<Self> {
        let service = Self::new(config, runner, events, registry);
        if !service.config.enabled {
            tracing::info!("Funnel disabled by config");
            return service;
        }

        let available = service.prober.probe().await;

        service
            .registry
            .register(FUNNEL_EXTENSION, Arc::clone(&service) as Arc<dyn FunnelApi>);
        service.registered.store(true, Ordering::SeqCst);

        if available {
            if let Some(target) = service.config.expose.as_ref().and_then(ExposeSpec::target) {
                match service.controller.expose(target.port, &target.path).await {
                    Some(url) => tracing::info!(port = target.port, url = %url, "Auto-exposed"),
                    None => tracing::warn!(port = target.port, "Auto-expose failed"),
                }
            }
        } else {
            tracing::warn!("Funnel agent unavailable; exposures will be refused");
        }

        service.start_monitor();
        service
    }

    /// Start the hostname monitor unless the interval is zero or it is
    /// already running.
    pub fn start_monitor(&self) {
        let secs = self.config.poll_interval_seconds;
        if secs == 0 || self.shut_down.load(Ordering::SeqCst) {
            return;
        }
        let Ok(mut task) = self.monitor_task.lock() else {
            return;
        };
        if task.is_some() {
            return;
        }
        tracing::debug!(interval_secs = secs, "Starting hostname monitor");
        *task = Some(
            Arc::clone(&self.monitor).spawn(Duration::from_secs(secs), self.cancel.child_token()),
        );
    }

    pub fn monitor_running(&self) -> bool {
        self.monitor_task
            .lock()
            .is_ok_and(|task| task.as_ref().is_some_and(|h| !h.is_finished()))
    }

    pub fn monitor(&self) -> &HostnameMonitor {
        &self.monitor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> Option<ActiveFunnel> {
        self.controller.active()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Fresh `status --json` output for presentation; bypasses the cache.
    pub async fn raw_status(&self) -> Option<String> {
        if !self.config.enabled {
            return None;
        }
        self.prober.fetch_raw_status().await
    }

    pub fn listener_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Tear everything down. Only the first call has any effect.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.cancel.cancel();
        if let Ok(mut task) = self.monitor_task.lock()
            && let Some(handle) = task.take()
        {
            handle.abort();
        }
        self.callbacks.clear();

        self.controller.shutdown().await;

        if self.registered.swap(false, Ordering::SeqCst) {
            self.registry.unregister(FUNNEL_EXTENSION);
        }

        {
            let mut state = lock(&self.state);
            state.active = None;
        }
        self.prober.reset();
        tracing::info!("Funnel service shut down");
    }
}

impl FunnelApi for FunnelService {
    fn is_available(&self) -> bool {
        self.prober.is_available()
    }

    fn hostname(&self) -> FunnelFuture<'_, Option<String>> {
        Box::pin(async move {
            if !self.config.enabled {
                return None;
            }
            self.prober.hostname().await
        })
    }

    fn expose<'a>(&'a self, port: u16, path: Option<&'a str>) -> FunnelFuture<'a, Option<String>> {
        Box::pin(async move {
            if !self.config.enabled || self.shut_down.load(Ordering::SeqCst) {
                return None;
            }
            self.controller.expose(port, path.unwrap_or("/")).await
        })
    }

    fn unexpose(&self, port: u16) -> FunnelFuture<'_, bool> {
        Box::pin(async move { self.controller.unexpose(port).await })
    }

    fn url(&self, port: u16) -> Option<String> {
        self.controller.url(port)
    }

    fn status(&self) -> FunnelStatus {
        self.controller.status()
    }

    fn on_hostname_change(&self, callback: HostnameCallback) {
        self.callbacks.register(callback);
    }

    fn port(&self) -> Option<u16> {
        self.controller.port()
    }
}
