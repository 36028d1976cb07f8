#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tailfunnel::error::AgentError;
use tailfunnel::runtime::tunnel::{AgentFuture, AgentRunner};

/// Agent double driven entirely by a settable `status --json` document.
pub struct ScriptedAgent {
    installed: bool,
    status: Mutex<Option<String>>,
    next_pid: AtomicU32,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAgent {
    pub fn running(hostname: &str) -> Arc<Self> {
        Self::with_status(true, Some(running_status(hostname)))
    }

    pub fn stopped() -> Arc<Self> {
        Self::with_status(true, Some(r#"{"BackendState":"Stopped"}"#.to_string()))
    }

    pub fn missing() -> Arc<Self> {
        Self::with_status(false, None)
    }

    fn with_status(installed: bool, status: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            installed,
            status: Mutex::new(status),
            next_pid: AtomicU32::new(7000),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn rename(&self, hostname: &str) {
        *self.status.lock().unwrap() = Some(running_status(hostname));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

pub fn running_status(hostname: &str) -> String {
    format!(
        r#"{{"BackendState":"Running","AuthURL":"https://login.example/a/hunter2","Self":{{"DNSName":"{hostname}.","HostName":"box","Online":true,"TailscaleIPs":["100.101.102.103"],"PublicKey":"nodekey:feed"}},"CurrentTailnet":{{"Name":"example.org"}}}}"#
    )
}

impl AgentRunner for ScriptedAgent {
    fn name(&self) -> &str {
        "scripted"
    }

    fn locate(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move { self.installed })
    }

    fn run(&self, args: Vec<String>, _timeout: Duration) -> AgentFuture<'_, String> {
        Box::pin(async move {
            let joined = args.join(" ");
            self.calls.lock().unwrap().push(format!("run {joined}"));
            if args.first().map(String::as_str) == Some("status") {
                return self
                    .status
                    .lock()
                    .unwrap()
                    .clone()
                    .ok_or(AgentError::NotInstalled);
            }
            Ok(String::new())
        })
    }

    fn spawn_detached(&self, args: Vec<String>) -> AgentFuture<'_, Option<u32>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push(format!("spawn {}", args.join(" ")));
            Ok(Some(self.next_pid.fetch_add(1, Ordering::SeqCst)))
        })
    }

    fn signal(&self, pid: u32) -> AgentFuture<'_, ()> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(format!("signal {pid}"));
            Ok(())
        })
    }
}
