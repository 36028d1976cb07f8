use crate::error::AgentError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by [`AgentRunner`] calls.
pub type AgentFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AgentError>> + Send + 'a>>;

/// Process-level capabilities the funnel core needs from the external agent.
///
/// The real implementation shells out to the `tailscale` CLI; tests swap in a
/// scripted runner. Nothing here knows about funnel state.
pub trait AgentRunner: Send + Sync {
    /// Human-readable agent name (e.g. "tailscale")
    fn name(&self) -> &str;

    /// Whether the agent executable can be found.
    fn locate(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// Run the agent to completion and capture stdout. A non-zero exit is an
    /// error; so is exceeding `timeout`, in which case the child is killed.
    fn run(&self, args: Vec<String>, timeout: Duration) -> AgentFuture<'_, String>;

    /// Launch the agent in the background without waiting on it. Returns the
    /// child's pid when the platform reports one.
    fn spawn_detached(&self, args: Vec<String>) -> AgentFuture<'_, Option<u32>>;

    /// Ask a previously spawned process to terminate (SIGTERM).
    fn signal(&self, pid: u32) -> AgentFuture<'_, ()>;
}
