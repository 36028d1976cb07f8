use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Event name emitted when the agent reports a new hostname.
pub const HOSTNAME_CHANGED_EVENT: &str = "funnel:hostname-changed";

/// Payload of [`HOSTNAME_CHANGED_EVENT`], also handed to registered callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostnameChange {
    pub old_hostname: String,
    pub new_hostname: String,
    pub active_port: Option<u16>,
    pub public_url: Option<String>,
}

/// Host-side event emission.
pub trait EventSink: Send + Sync {
    fn emit(&self, name: &str, payload: Value);
}

/// Writes every event to the log.
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, name: &str, payload: Value) {
        tracing::info!(event = name, payload = %payload, "event.emit");
    }
}

/// Keeps emitted events in memory, newest last.
#[derive(Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<(String, Value)>>,
}

impl MemoryEventSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, name: &str, payload: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push((name.to_string(), payload));
        }
    }
}
