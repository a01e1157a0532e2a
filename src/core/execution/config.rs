//! Configuration for scheduler execution
//!
//! Controls how long robots dwell on platforms, whether the run is bounded,
//! and how the per-robot half of each tick is executed.

use crate::core::errors::ConfigError;
use crate::core::types::{Kind, Tick};
use std::collections::BTreeMap;

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// Robots are prepared in id order within a single thread
    Sequential,
    /// Robots are prepared in parallel with Rayon; admission stays sequential
    Rayon,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Sequential
    }
}

/// How many ticks a robot stays on a platform after admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DwellPolicy {
    /// Every visit lasts the same number of ticks
    Uniform(Tick),
    /// Looked up by (robot kind, platform kind), falling back to `default`
    ByKind {
        default: Tick,
        table: BTreeMap<(Kind, Kind), Tick>,
    },
}

impl DwellPolicy {
    pub fn by_kind(default: Tick) -> Self {
        DwellPolicy::ByKind {
            default,
            table: BTreeMap::new(),
        }
    }

    /// Add a (robot kind, platform kind) entry. No-op on `Uniform`.
    pub fn with_entry(mut self, robot: impl Into<Kind>, platform: impl Into<Kind>, ticks: Tick) -> Self {
        if let DwellPolicy::ByKind { table, .. } = &mut self {
            table.insert((robot.into(), platform.into()), ticks);
        }
        self
    }

    pub fn dwell_for(&self, robot: Option<&Kind>, platform: Option<&Kind>) -> Tick {
        match self {
            DwellPolicy::Uniform(ticks) => *ticks,
            DwellPolicy::ByKind { default, table } => match (robot, platform) {
                (Some(r), Some(p)) => table
                    .get(&(r.clone(), p.clone()))
                    .copied()
                    .unwrap_or(*default),
                _ => *default,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            DwellPolicy::Uniform(0) => Err(ConfigError::ZeroDwell("uniform".to_string())),
            DwellPolicy::Uniform(_) => Ok(()),
            DwellPolicy::ByKind { default, table } => {
                if *default == 0 {
                    return Err(ConfigError::ZeroDwell("default".to_string()));
                }
                match table.iter().find(|(_, ticks)| **ticks == 0) {
                    Some(((robot, platform), _)) => Err(ConfigError::ZeroDwell(format!(
                        "robot kind '{}' on platform kind '{}'",
                        robot, platform
                    ))),
                    None => Ok(()),
                }
            }
        }
    }
}

impl Default for DwellPolicy {
    fn default() -> Self {
        DwellPolicy::Uniform(1)
    }
}

/// Configuration for a scheduler run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub dwell: DwellPolicy,
    /// Optional safeguard; the run is unbounded when `None`
    pub max_ticks: Option<Tick>,
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl SchedulerConfig {
    /// Create a new configuration with default values
    ///
    /// Default configuration dwells one tick per visit, runs unbounded and sequentially
    pub fn new() -> Self {
        Self {
            dwell: DwellPolicy::default(),
            max_ticks: None,
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
        }
    }

    pub fn with_dwell(mut self, dwell: DwellPolicy) -> Self {
        self.dwell = dwell;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Tick) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Set the concurrency mode for the simulation
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Reject settings the scheduler cannot honour: zero dwell or a zero tick limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dwell.validate()?;
        if self.max_ticks == Some(0) {
            return Err(ConfigError::ZeroTickLimit);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.dwell, DwellPolicy::Uniform(1));
        assert_eq!(config.max_ticks, None);
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Sequential);
        assert_eq!(config.thread_pool_size, None);
    }

    #[test]
    fn test_config_builder() {
        let config = SchedulerConfig::new()
            .with_dwell(DwellPolicy::Uniform(3))
            .with_max_ticks(100)
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4);

        assert_eq!(config.dwell, DwellPolicy::Uniform(3));
        assert_eq!(config.max_ticks, Some(100));
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.thread_pool_size, Some(4));
    }

    #[test]
    fn test_dwell_by_kind_lookup() {
        let policy = DwellPolicy::by_kind(1)
            .with_entry("organizer", "A", 30)
            .with_entry("mover", "B", 35);
        let organizer = Kind::from("organizer");
        let mover = Kind::from("mover");
        let a = Kind::from("A");
        let b = Kind::from("B");

        assert_eq!(policy.dwell_for(Some(&organizer), Some(&a)), 30);
        assert_eq!(policy.dwell_for(Some(&mover), Some(&b)), 35);
        assert_eq!(policy.dwell_for(Some(&mover), Some(&a)), 1);
        assert_eq!(policy.dwell_for(None, Some(&a)), 1);
    }

    #[test]
    fn test_zero_dwell_rejected() {
        assert!(DwellPolicy::Uniform(0).validate().is_err());
        assert!(DwellPolicy::by_kind(0).validate().is_err());
        let err = DwellPolicy::by_kind(1).with_entry("mover", "A", 0).validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::ZeroDwell("robot kind 'mover' on platform kind 'A'".to_string())
        );
        assert!(DwellPolicy::Uniform(2).validate().is_ok());
    }

    #[test]
    fn test_zero_tick_limit_rejected() {
        assert_eq!(
            SchedulerConfig::new().with_max_ticks(0).validate(),
            Err(ConfigError::ZeroTickLimit)
        );
        assert_eq!(
            SchedulerConfig::new().with_dwell(DwellPolicy::Uniform(0)).validate(),
            Err(ConfigError::ZeroDwell("uniform".to_string()))
        );
        assert!(SchedulerConfig::new().with_max_ticks(1).validate().is_ok());
    }
}
