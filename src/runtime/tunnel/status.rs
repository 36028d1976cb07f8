use serde::Deserialize;

/// Backend state reported once the node is connected to its tailnet.
pub const RUNNING_STATE: &str = "Running";

/// Subset of `tailscale status --json` the funnel core reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentStatus {
    #[serde(default)]
    pub backend_state: String,
    #[serde(rename = "Self", default)]
    pub self_node: Option<SelfNode>,
    #[serde(default)]
    pub current_tailnet: Option<TailnetInfo>,
    #[serde(rename = "MagicDNSSuffix", default)]
    pub magic_dns_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelfNode {
    #[serde(rename = "DNSName", default)]
    pub dns_name: String,
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub online: bool,
    #[serde(rename = "TailscaleIPs", default)]
    pub tailscale_ips: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TailnetInfo {
    #[serde(default)]
    pub name: String,
}

impl AgentStatus {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn is_running(&self) -> bool {
        self.backend_state == RUNNING_STATE
    }

    /// Externally-routable name of this node, without the trailing root dot.
    pub fn hostname(&self) -> Option<String> {
        let dns = self.self_node.as_ref()?.dns_name.trim();
        let dns = dns.strip_suffix('.').unwrap_or(dns);
        (!dns.is_empty()).then(|| dns.to_string())
    }
}
