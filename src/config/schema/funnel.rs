use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "/".into()
}

/// A single port to expose at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposeTarget {
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
}

/// `expose = { port = 8080 }` or the legacy `[[expose]]` array form.
///
/// Only the first array element is honored; the agent can only expose one
/// port at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExposeSpec {
    Single(ExposeTarget),
    Many(Vec<ExposeTarget>),
}

impl ExposeSpec {
    pub fn target(&self) -> Option<&ExposeTarget> {
        match self {
            Self::Single(target) => Some(target),
            Self::Many(targets) => {
                if targets.len() > 1 {
                    tracing::warn!(
                        count = targets.len(),
                        "Multiple expose entries configured; only the first is used"
                    );
                }
                targets.first()
            }
        }
    }
}
