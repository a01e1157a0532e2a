/// Identifier of a robot. Ascending id order is the contention tie-break order.
pub type RobotId = u64;

/// Identifier of a platform.
pub type PlatformId = u64;

/// Simulation time, counted in whole ticks from 1.
pub type Tick = u64;

/// Free-form label attached to robots and platforms (e.g. "organizer", "A").
///
/// Kinds only matter to [`DwellPolicy::ByKind`](crate::core::execution::config::DwellPolicy);
/// the scheduler itself never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Kind(String);

impl Kind {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Kind {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
