use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `tailfunnel`.
///
/// The public funnel surface never returns these: it degrades to `None` /
/// `false`. They travel between the agent runner, config loading and the CLI,
/// where callers decide whether to log or print them.
#[derive(Debug, Error)]
pub enum FunnelError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── External agent ──────────────────────────────────────────────────
    #[error("agent: {0}")]
    Agent(#[from] AgentError),

    // ── Command line ────────────────────────────────────────────────────
    #[error("{0}")]
    Cli(#[from] CliError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Agent errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent executable not found on PATH")]
    NotInstalled,

    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("`{command}` exited with {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to spawn agent process: {0}")]
    Spawn(String),

    #[error("failed to signal pid {pid}: {message}")]
    Signal { pid: u32, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── CLI errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid port number")]
    InvalidPort(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, FunnelError>;
