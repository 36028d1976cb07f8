use std::sync::Arc;

use tailfunnel::app::status::{collect_report, render_report};
use tailfunnel::config::Config;
use tailfunnel::plugins::ExtensionRegistry;
use tailfunnel::runtime::tunnel::{FunnelApi, FunnelService, LogEventSink};

use super::fake_agent::ScriptedAgent;

#[tokio::test]
async fn report_is_complete_and_free_of_credentials() {
    let agent = ScriptedAgent::running("node.example.ts.net");
    let config = Config {
        poll_interval_seconds: 0,
        ..Config::default()
    };
    let service =
        FunnelService::init(config, agent.clone(), Arc::new(LogEventSink), ExtensionRegistry::new())
            .await;
    service.expose(8080, None).await.unwrap();

    let report = collect_report(&service).await;
    assert!(report.summary.enabled);
    assert!(report.summary.available);
    assert_eq!(report.summary.active_port, Some(8080));
    assert_eq!(report.routes.len(), 1);
    assert_eq!(report.routes[0].target, "localhost:8080");
    assert!(report.node.online);
    assert_eq!(report.node.ips, vec!["100.101.102.103".to_string()]);
    assert_eq!(report.node.tailnet.as_deref(), Some("example.org"));
    assert_eq!(report.stats.exposures_started, 1);

    let json = serde_json::to_string(&report).unwrap();
    let text = render_report(&report);
    for needle in ["AuthURL", "hunter2", "PublicKey", "nodekey"] {
        assert!(!json.contains(needle), "json leaked {needle}");
        assert!(!text.contains(needle), "text leaked {needle}");
    }
    assert!(text.contains("https://node.example.ts.net → localhost:8080"));

    service.shutdown().await;
}

#[tokio::test]
async fn disabled_report_skips_the_agent() {
    let agent = ScriptedAgent::running("node.example.ts.net");
    let config = Config {
        enabled: false,
        ..Config::default()
    };
    let service =
        FunnelService::init(config, agent.clone(), Arc::new(LogEventSink), ExtensionRegistry::new())
            .await;

    let report = collect_report(&service).await;
    assert!(!report.summary.enabled);
    assert!(!report.summary.available);
    assert!(report.routes.is_empty());
    assert!(!report.node.online);
    assert!(agent.calls().is_empty());
}
