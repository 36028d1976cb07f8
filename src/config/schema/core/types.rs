use super::super::ExposeSpec;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    60
}

fn default_agent_binary() -> String {
    "tailscale".into()
}

fn default_command_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from - not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// When false the funnel extension is never registered and the agent is
    /// never probed.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Port auto-exposed at startup when the agent is available.
    #[serde(default)]
    pub expose: Option<ExposeSpec>,

    /// Hostname drift polling interval. `0` disables the monitor.
    #[serde(default = "default_poll_interval", alias = "pollIntervalSeconds")]
    pub poll_interval_seconds: u64,

    #[serde(default = "default_agent_binary")]
    pub agent_binary: String,

    /// Upper bound for `status` and `funnel ... off` invocations.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            enabled: true,
            expose: None,
            poll_interval_seconds: default_poll_interval(),
            agent_binary: default_agent_binary(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(target) = self.expose.as_ref().and_then(ExposeSpec::target)
            && target.port == 0
        {
            return Err(ConfigError::Validation(
                "expose.port must be a positive port number".into(),
            ));
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "command_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.agent_binary.trim().is_empty() {
            return Err(ConfigError::Validation(
                "agent_binary must not be empty".into(),
            ));
        }
        Ok(())
    }
}
