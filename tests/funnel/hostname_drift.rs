use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tailfunnel::config::Config;
use tailfunnel::plugins::ExtensionRegistry;
use tailfunnel::runtime::tunnel::{
    FunnelApi, FunnelService, HOSTNAME_CHANGED_EVENT, HostnameChange, MemoryEventSink,
};

use super::fake_agent::ScriptedAgent;

#[tokio::test]
async fn rename_rewrites_url_and_notifies_everyone() {
    let agent = ScriptedAgent::running("old.example.ts.net");
    let events = MemoryEventSink::new();
    let config = Config {
        poll_interval_seconds: 0,
        ..Config::default()
    };
    let service = FunnelService::init(
        config,
        agent.clone(),
        events.clone(),
        ExtensionRegistry::new(),
    )
    .await;

    let seen: Arc<Mutex<Vec<HostnameChange>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    service.on_hostname_change(Arc::new(move |change: &HostnameChange| -> anyhow::Result<()> {
        sink.lock().unwrap().push(change.clone());
        Ok(())
    }));

    service.expose(8080, Some("/hook")).await.unwrap();
    agent.rename("new.example.ts.net");

    let change = service.monitor().tick().await.expect("drift detected");
    assert_eq!(change.old_hostname, "old.example.ts.net");
    assert_eq!(change.new_hostname, "new.example.ts.net");
    assert_eq!(change.active_port, Some(8080));
    assert_eq!(
        change.public_url.as_deref(),
        Some("https://new.example.ts.net/hook")
    );

    assert_eq!(
        service.url(8080).as_deref(),
        Some("https://new.example.ts.net/hook")
    );
    assert_eq!(service.status().hostname.as_deref(), Some("new.example.ts.net"));

    let emitted = events.events();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].0, HOSTNAME_CHANGED_EVENT);
    assert_eq!(emitted[0].1["newHostname"], "new.example.ts.net");
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(service.stats().hostname_changes, 1);

    // Same hostname again: nothing new.
    assert!(service.monitor().tick().await.is_none());
    assert_eq!(events.events().len(), 1);

    service.shutdown().await;
}

#[tokio::test]
async fn shutdown_drops_listeners() {
    let agent = ScriptedAgent::running("old.example.ts.net");
    let config = Config {
        poll_interval_seconds: 0,
        ..Config::default()
    };
    let service = FunnelService::init(
        config,
        agent.clone(),
        MemoryEventSink::new(),
        ExtensionRegistry::new(),
    )
    .await;

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    service.on_hostname_change(Arc::new(move |_: &HostnameChange| -> anyhow::Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    assert_eq!(service.listener_count(), 1);

    service.shutdown().await;
    assert_eq!(service.listener_count(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
