use super::Config;

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("TAILFUNNEL_ENABLED")
            && let Some(enabled) = parse_bool(&raw)
        {
            self.enabled = enabled;
        }

        if let Ok(raw) = std::env::var("TAILFUNNEL_POLL_INTERVAL")
            && let Ok(secs) = raw.trim().parse::<u64>()
        {
            self.poll_interval_seconds = secs;
        }

        if let Ok(bin) = std::env::var("TAILFUNNEL_AGENT_BIN")
            && !bin.is_empty()
        {
            self.agent_binary = bin;
        }
    }
}
