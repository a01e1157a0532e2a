use super::types::{PlatformId, RobotId, Tick};
use thiserror::Error;

/// Reasons a scenario is rejected before the first tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("robot {robot} references unknown platform {platform}")]
    UnknownPlatform { robot: RobotId, platform: PlatformId },

    #[error("platform {platform} has capacity {capacity}, must be at least 1")]
    NonPositiveCapacity { platform: PlatformId, capacity: i64 },

    #[error("duplicate robot id {0}")]
    DuplicateRobot(RobotId),

    #[error("duplicate platform id {0}")]
    DuplicatePlatform(PlatformId),

    #[error("robot {robot} visits platform {platform} more than once")]
    RepeatedPlatform { robot: RobotId, platform: PlatformId },

    #[error("dwell time must be at least 1 tick ({0})")]
    ZeroDwell(String),

    #[error("tick limit must be at least 1 tick")]
    ZeroTickLimit,

    #[error("thread pool: {0}")]
    ThreadPool(String),
}

/// A robot left waiting when a deadlock is declared.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BlockedRobot {
    pub robot: RobotId,
    pub waiting_on: PlatformId,
    pub holding: Option<PlatformId>,
}

impl std::fmt::Display for BlockedRobot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "robot {} waiting on platform {}", self.robot, self.waiting_on)?;
        if let Some(held) = self.holding {
            write!(f, " (holding platform {})", held)?;
        }
        Ok(())
    }
}

fn describe_blocked(blocked: &[BlockedRobot]) -> String {
    blocked
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fatal simulation errors. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("deadlock at tick {tick}: {}", describe_blocked(.blocked))]
    Deadlock {
        tick: Tick,
        blocked: Vec<BlockedRobot>,
    },

    /// Internal bookkeeping was broken. Indicates a scheduler bug.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("tick limit of {max_ticks} reached before all robots finished")]
    TickLimitReached { max_ticks: Tick },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadlock_message_lists_blocked_robots() {
        let err = SimError::Deadlock {
            tick: 3,
            blocked: vec![
                BlockedRobot { robot: 1, waiting_on: 2, holding: Some(1) },
                BlockedRobot { robot: 2, waiting_on: 1, holding: None },
            ],
        };
        assert_eq!(
            err.to_string(),
            "deadlock at tick 3: robot 1 waiting on platform 2 (holding platform 1); \
             robot 2 waiting on platform 1"
        );
    }

    #[test]
    fn test_config_error_converts_into_sim_error() {
        let err: SimError = ConfigError::DuplicateRobot(7).into();
        assert_eq!(err, SimError::InvalidConfiguration(ConfigError::DuplicateRobot(7)));
        assert_eq!(err.to_string(), "invalid configuration: duplicate robot id 7");
    }
}
