use crate::core::errors::{ConfigError, SimError};
use crate::core::execution::config::SchedulerConfig;
use crate::core::execution::scheduler::Scheduler;
use crate::core::platform::Platform;
use crate::core::robot::Robot;
use crate::core::types::{Kind, PlatformId, RobotId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Unvalidated platform definition, as read from input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub id: PlatformId,
    /// Signed so that bad input survives until validation reports it
    pub capacity: i64,
    pub kind: Option<Kind>,
}

impl PlatformSpec {
    pub fn new(id: PlatformId, capacity: i64) -> Self {
        Self { id, capacity, kind: None }
    }

    pub fn with_kind(mut self, kind: impl Into<Kind>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Unvalidated robot definition, as read from input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotSpec {
    pub id: RobotId,
    pub path: Vec<PlatformId>,
    pub kind: Option<Kind>,
}

impl RobotSpec {
    pub fn new(id: RobotId, path: Vec<PlatformId>) -> Self {
        Self { id, path, kind: None }
    }

    pub fn with_kind(mut self, kind: impl Into<Kind>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Collects platform and robot definitions and turns them into a [`Scheduler`].
///
/// Nothing is checked while adding; [`Simulation::build`] validates the whole
/// scenario at once and refuses to start on the first problem found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    platforms: Vec<PlatformSpec>,
    robots: Vec<RobotSpec>,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_platform(&mut self, platform: PlatformSpec) -> &mut Self {
        self.platforms.push(platform);
        self
    }

    pub fn add_robot(&mut self, robot: RobotSpec) -> &mut Self {
        self.robots.push(robot);
        self
    }

    pub fn platforms(&self) -> &[PlatformSpec] {
        &self.platforms
    }

    pub fn robots(&self) -> &[RobotSpec] {
        &self.robots
    }

    /// Check the scenario without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut platform_ids = HashSet::new();
        for platform in &self.platforms {
            if !platform_ids.insert(platform.id) {
                return Err(ConfigError::DuplicatePlatform(platform.id));
            }
            if platform.capacity < 1 {
                return Err(ConfigError::NonPositiveCapacity {
                    platform: platform.id,
                    capacity: platform.capacity,
                });
            }
        }

        let mut robot_ids = HashSet::new();
        for robot in &self.robots {
            if !robot_ids.insert(robot.id) {
                return Err(ConfigError::DuplicateRobot(robot.id));
            }
            let mut seen = BTreeSet::new();
            for &platform in &robot.path {
                if !platform_ids.contains(&platform) {
                    return Err(ConfigError::UnknownPlatform {
                        robot: robot.id,
                        platform,
                    });
                }
                if !seen.insert(platform) {
                    return Err(ConfigError::RepeatedPlatform {
                        robot: robot.id,
                        platform,
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate and construct a scheduler ready to run.
    pub fn build(&self, config: SchedulerConfig) -> Result<Scheduler, SimError> {
        self.validate()?;

        let platforms: BTreeMap<PlatformId, Platform> = self
            .platforms
            .iter()
            .map(|spec| {
                let capacity = usize::try_from(spec.capacity).unwrap_or(usize::MAX);
                (spec.id, Platform::new(spec.id, capacity, spec.kind.clone()))
            })
            .collect();
        let robots: Vec<Robot> = self
            .robots
            .iter()
            .map(|spec| Robot::new(spec.id, spec.path.clone(), spec.kind.clone()))
            .collect();

        debug!(
            "Built scenario with {} platforms and {} robots",
            platforms.len(),
            robots.len()
        );
        Scheduler::new(platforms, robots, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_platforms() -> Simulation {
        let mut sim = Simulation::new();
        sim.add_platform(PlatformSpec::new(1, 2))
            .add_platform(PlatformSpec::new(2, 1));
        sim
    }

    #[test]
    fn test_valid_scenario_builds() {
        let mut sim = two_platforms();
        sim.add_robot(RobotSpec::new(2, vec![1]))
            .add_robot(RobotSpec::new(1, vec![1, 2]));
        let scheduler = sim.build(SchedulerConfig::default()).unwrap();

        let ids: Vec<_> = scheduler.robots().iter().map(Robot::id).collect();
        assert_eq!(ids, vec![1, 2], "robots are evaluated in ascending id order");
        assert_eq!(scheduler.current_tick(), 0);
        assert_eq!(scheduler.platform(1).map(Platform::capacity), Some(2));
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let mut sim = two_platforms();
        sim.add_robot(RobotSpec::new(1, vec![1, 9]));
        assert_eq!(
            sim.validate(),
            Err(ConfigError::UnknownPlatform { robot: 1, platform: 9 })
        );
    }

    #[test]
    fn test_non_positive_capacity_rejected() {
        let mut sim = Simulation::new();
        sim.add_platform(PlatformSpec::new(1, 0));
        assert_eq!(
            sim.validate(),
            Err(ConfigError::NonPositiveCapacity { platform: 1, capacity: 0 })
        );

        let mut sim = Simulation::new();
        sim.add_platform(PlatformSpec::new(3, -2));
        assert!(matches!(
            sim.build(SchedulerConfig::default()),
            Err(SimError::InvalidConfiguration(ConfigError::NonPositiveCapacity { .. }))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut sim = two_platforms();
        sim.add_platform(PlatformSpec::new(2, 4));
        assert_eq!(sim.validate(), Err(ConfigError::DuplicatePlatform(2)));

        let mut sim = two_platforms();
        sim.add_robot(RobotSpec::new(5, vec![1]))
            .add_robot(RobotSpec::new(5, vec![2]));
        assert_eq!(sim.validate(), Err(ConfigError::DuplicateRobot(5)));
    }

    #[test]
    fn test_revisit_rejected() {
        let mut sim = two_platforms();
        sim.add_robot(RobotSpec::new(1, vec![1, 2, 1]));
        assert_eq!(
            sim.validate(),
            Err(ConfigError::RepeatedPlatform { robot: 1, platform: 1 })
        );
    }

    #[test]
    fn test_zero_dwell_rejected_at_build() {
        use crate::core::execution::config::DwellPolicy;

        let sim = two_platforms();
        let result = sim.build(SchedulerConfig::new().with_dwell(DwellPolicy::Uniform(0)));
        assert!(matches!(
            result,
            Err(SimError::InvalidConfiguration(ConfigError::ZeroDwell(_)))
        ));
    }
}
