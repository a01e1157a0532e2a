use super::errors::BlockedRobot;
use super::types::{PlatformId, RobotId, Tick};
use serde::Serialize;
use std::collections::BTreeMap;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    AllDone,
    Deadlock { blocked: Vec<BlockedRobot> },
    TickLimitReached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotResult {
    pub robot_id: RobotId,
    pub total_time: Tick,
    /// False when `total_time` is only the tick the run stopped at
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformResult {
    pub platform_id: PlatformId,
    pub visit_count: u64,
    pub visitors: Vec<RobotId>,
}

/// Read-only view of a run for whoever renders the output tables.
///
/// Rows are ascending by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// `None` while the run is still in progress
    pub outcome: Option<Outcome>,
    pub final_tick: Tick,
    pub robots: Vec<RobotResult>,
    pub platforms: Vec<PlatformResult>,
}

impl SimulationReport {
    /// True when every robot finished and the times are real completion times.
    pub fn is_complete(&self) -> bool {
        self.outcome == Some(Outcome::AllDone)
    }

    pub fn robot_times(&self) -> BTreeMap<RobotId, Tick> {
        self.robots.iter().map(|r| (r.robot_id, r.total_time)).collect()
    }

    pub fn visit_counts(&self) -> BTreeMap<PlatformId, u64> {
        self.platforms.iter().map(|p| (p.platform_id, p.visit_count)).collect()
    }

    pub fn total_visits(&self) -> u64 {
        self.platforms.iter().map(|p| p.visit_count).sum()
    }
}
