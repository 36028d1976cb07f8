use std::sync::Arc;

use tailfunnel::config::{Config, ExposeSpec, ExposeTarget};
use tailfunnel::plugins::ExtensionRegistry;
use tailfunnel::runtime::tunnel::{
    EventSink, FUNNEL_EXTENSION, FunnelApi, FunnelService, MemoryEventSink,
};

use super::fake_agent::ScriptedAgent;

fn config(expose: Option<u16>) -> Config {
    Config {
        expose: expose.map(|port| {
            ExposeSpec::Single(ExposeTarget {
                port,
                path: "/".into(),
            })
        }),
        poll_interval_seconds: 0,
        ..Config::default()
    }
}

async fn start(
    agent: &Arc<ScriptedAgent>,
    config: Config,
) -> (Arc<FunnelService>, Arc<ExtensionRegistry>) {
    let registry = ExtensionRegistry::new();
    let events: Arc<dyn EventSink> = MemoryEventSink::new();
    let service =
        FunnelService::init(config, agent.clone(), events, Arc::clone(&registry)).await;
    (service, registry)
}

#[tokio::test]
async fn extension_is_registered_and_usable_through_registry() {
    let agent = ScriptedAgent::running("node.example.ts.net");
    let (service, registry) = start(&agent, config(None)).await;

    let api = registry
        .get::<Arc<dyn FunnelApi>>(FUNNEL_EXTENSION)
        .expect("funnel extension registered");
    assert!(api.is_available());
    assert_eq!(
        api.hostname().await.as_deref(),
        Some("node.example.ts.net")
    );

    let url = api.expose(8080, None).await;
    assert_eq!(url.as_deref(), Some("https://node.example.ts.net"));
    assert_eq!(api.port(), Some(8080));
    assert_eq!(api.url(8080).as_deref(), Some("https://node.example.ts.net"));
    assert_eq!(api.url(9090), None);

    service.shutdown().await;
    assert!(!registry.contains(FUNNEL_EXTENSION));
}

#[tokio::test]
async fn exposing_a_second_port_replaces_the_first() {
    let agent = ScriptedAgent::running("node.example.ts.net");
    let (service, _registry) = start(&agent, config(None)).await;

    assert!(service.expose(3000, Some("api")).await.is_some());
    assert_eq!(
        service.url(3000).as_deref(),
        Some("https://node.example.ts.net/api")
    );

    assert!(service.expose(4000, None).await.is_some());
    assert_eq!(service.port(), Some(4000));
    assert_eq!(service.url(3000), None);

    let status = service.status();
    assert_eq!(status.funnels.len(), 1);
    assert_eq!(status.funnels[0].port, 4000);

    let calls = agent.calls();
    let off = calls
        .iter()
        .position(|c| c == "run funnel 3000 off")
        .expect("old port turned off");
    let spawn = calls
        .iter()
        .position(|c| c == "spawn funnel 4000")
        .expect("new port spawned");
    assert!(off < spawn);

    service.shutdown().await;
}

#[tokio::test]
async fn configured_port_is_exposed_at_startup() {
    let agent = ScriptedAgent::running("node.example.ts.net");
    let (service, _registry) = start(&agent, config(Some(5173))).await;

    assert_eq!(service.port(), Some(5173));
    assert_eq!(agent.count("spawn funnel 5173"), 1);
    assert_eq!(service.stats().exposures_started, 1);

    service.shutdown().await;
    assert_eq!(agent.count("run funnel 5173 off"), 1);
    assert_eq!(service.port(), None);
}

#[tokio::test]
async fn stopped_agent_refuses_every_exposure() {
    let agent = ScriptedAgent::stopped();
    let (service, registry) = start(&agent, config(Some(8080))).await;

    assert!(registry.contains(FUNNEL_EXTENSION));
    assert!(!service.is_available());
    assert_eq!(service.expose(8080, None).await, None);
    assert_eq!(agent.count("spawn"), 0);
    assert!(!service.unexpose(8080).await);

    service.shutdown().await;
}

#[tokio::test]
async fn missing_agent_is_never_queried() {
    let agent = ScriptedAgent::missing();
    let (service, _registry) = start(&agent, config(None)).await;

    assert!(!service.is_available());
    assert_eq!(agent.count("run status"), 0);
    assert_eq!(service.expose(8080, None).await, None);

    service.shutdown().await;
}

#[tokio::test]
async fn disabled_service_stays_inert() {
    let agent = ScriptedAgent::running("node.example.ts.net");
    let config = Config {
        enabled: false,
        ..config(Some(8080))
    };
    let (service, registry) = start(&agent, config).await;

    assert!(!registry.contains(FUNNEL_EXTENSION));
    assert!(agent.calls().is_empty());
    assert_eq!(service.expose(8080, None).await, None);

    service.shutdown().await;
    assert!(agent.calls().is_empty());
}
