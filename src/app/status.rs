use crate::runtime::tunnel::{AgentStatus, FunnelApi, FunnelService, StatsSnapshot};
use serde::Serialize;
use serde_json::Value;

/// Status keys that must never reach a projection, matched exactly.
const EXCLUDED_KEYS: &[&str] = &[
    "AuthURL",
    "AuthKey",
    "Token",
    "Secret",
    "Password",
    "Credential",
];

/// Lowercase fragments that mark a key as credential-like.
const EXCLUDED_FRAGMENTS: &[&str] = &["auth", "token", "secret", "key", "password", "credential"];

fn is_excluded(key: &str) -> bool {
    if EXCLUDED_KEYS.contains(&key) {
        return true;
    }
    let lower = key.to_ascii_lowercase();
    EXCLUDED_FRAGMENTS.iter().any(|f| lower.contains(f))
}

/// Strip credential-like keys from a raw agent status document, recursively.
pub fn redact_status(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !is_excluded(k))
                .map(|(k, v)| (k, redact_status(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_status).collect()),
        other => other,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelSummary {
    pub enabled: bool,
    pub available: bool,
    pub hostname: Option<String>,
    pub active_port: Option<u16>,
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub port: u16,
    pub path: String,
    pub public_url: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeInfo {
    pub online: bool,
    pub ips: Vec<String>,
    pub tailnet: Option<String>,
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub summary: FunnelSummary,
    pub routes: Vec<RouteInfo>,
    pub node: NodeInfo,
    pub stats: StatsSnapshot,
}

pub fn summary(enabled: bool, api: &dyn FunnelApi) -> FunnelSummary {
    let status = api.status();
    let active = status.funnels.first();
    FunnelSummary {
        enabled,
        available: status.available,
        hostname: status.hostname.clone(),
        active_port: active.map(|f| f.port),
        public_url: active.map(|f| f.public_url.clone()),
    }
}

pub fn routes(api: &dyn FunnelApi) -> Vec<RouteInfo> {
    api.status()
        .funnels
        .into_iter()
        .map(|f| RouteInfo {
            target: format!("localhost:{}", f.port),
            port: f.port,
            path: f.path,
            public_url: f.public_url,
        })
        .collect()
}

/// Node projection from raw status output. Malformed or missing output falls
/// back to the cached hostname and an offline node.
pub fn node_info(raw: Option<&str>, cached_hostname: Option<String>) -> NodeInfo {
    let fallback = || NodeInfo {
        hostname: cached_hostname.clone(),
        ..NodeInfo::default()
    };
    let Some(raw) = raw else {
        return fallback();
    };
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        tracing::debug!("Status projection: raw status is not JSON, using cached values");
        return fallback();
    };
    let Ok(status) = serde_json::from_value::<AgentStatus>(redact_status(value)) else {
        return fallback();
    };

    let node = status.self_node.as_ref();
    NodeInfo {
        online: node.is_some_and(|n| n.online),
        ips: node.map(|n| n.tailscale_ips.clone()).unwrap_or_default(),
        tailnet: status
            .current_tailnet
            .as_ref()
            .map(|t| t.name.clone())
            .filter(|n| !n.is_empty()),
        hostname: status.hostname().or(cached_hostname),
    }
}

pub async fn collect_report(service: &FunnelService) -> StatusReport {
    let raw = service.raw_status().await;
    let status = service.status();
    StatusReport {
        summary: summary(service.config().enabled, service),
        routes: routes(service),
        node: node_info(raw.as_deref(), status.hostname),
        stats: service.stats(),
    }
}

pub fn render_report(report: &StatusReport) -> String {
    let on_off = |b: bool| if b { "yes" } else { "no" };
    let mut lines = vec![
        "◆ Funnel status".to_string(),
        String::new(),
        format!("  Enabled      {}", on_off(report.summary.enabled)),
        format!("  Available    {}", on_off(report.summary.available)),
        format!(
            "  Hostname     {}",
            report.summary.hostname.as_deref().unwrap_or("(unknown)")
        ),
        String::new(),
        "◆ Node".to_string(),
        format!(
            "  Online       {}",
            if report.node.online { "online" } else { "offline" }
        ),
        format!(
            "  IPs          {}",
            if report.node.ips.is_empty() {
                "(none)".to_string()
            } else {
                report.node.ips.join(", ")
            }
        ),
        format!(
            "  Tailnet      {}",
            report.node.tailnet.as_deref().unwrap_or("(unknown)")
        ),
        String::new(),
        "◆ Routes".to_string(),
    ];

    if report.routes.is_empty() {
        lines.push("  (none)".to_string());
    }
    for route in &report.routes {
        lines.push(format!("  {} → {}", route.public_url, route.target));
    }

    lines.push(String::new());
    lines.push("◆ Stats".to_string());
    lines.push(format!(
        "  Exposures    {} started, {} stopped",
        report.stats.exposures_started, report.stats.exposures_stopped
    ));
    lines.push(format!(
        "  Hostname     {} changes",
        report.stats.hostname_changes
    ));
    lines.push(format!(
        "  Checks       {} status queries",
        report.stats.status_checks
    ));
    lines.push(format!("  Uptime       {}", report.stats.uptime));

    lines.join("\n")
}
