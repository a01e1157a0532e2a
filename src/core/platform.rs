use super::errors::SimError;
use super::types::{Kind, PlatformId, RobotId};
use std::collections::BTreeSet;

/// A shared node with bounded concurrent occupancy.
///
/// Occupancy only changes through [`Platform::try_enter`] and [`Platform::leave`],
/// which keeps `occupancy() <= capacity()` enforceable in one place.
#[derive(Debug, Clone)]
pub struct Platform {
    id: PlatformId,
    capacity: usize,
    kind: Option<Kind>,
    occupants: BTreeSet<RobotId>,
    visit_count: u64,
    /// Robots in admission order, one entry per visit
    visitors: Vec<RobotId>,
}

impl Platform {
    pub fn new(id: PlatformId, capacity: usize, kind: Option<Kind>) -> Self {
        debug_assert!(capacity >= 1, "platform capacity must be >= 1");
        Self {
            id,
            capacity,
            kind,
            occupants: BTreeSet::new(),
            visit_count: 0,
            visitors: Vec::new(),
        }
    }

    /// Admit `robot` if a slot is free. Returns false and changes nothing otherwise.
    pub fn try_enter(&mut self, robot: RobotId) -> bool {
        if self.is_full() || self.occupants.contains(&robot) {
            return false;
        }
        self.occupants.insert(robot);
        self.visit_count += 1;
        self.visitors.push(robot);
        true
    }

    pub fn leave(&mut self, robot: RobotId) -> Result<(), SimError> {
        if self.occupants.remove(&robot) {
            Ok(())
        } else {
            Err(SimError::InvariantViolation(format!(
                "robot {} left platform {} without occupying it",
                robot, self.id
            )))
        }
    }

    pub fn id(&self) -> PlatformId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn kind(&self) -> Option<&Kind> {
        self.kind.as_ref()
    }

    pub fn occupancy(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }

    /// Current occupants, ascending by id.
    pub fn occupants(&self) -> impl Iterator<Item = RobotId> + '_ {
        self.occupants.iter().copied()
    }

    pub fn visit_count(&self) -> u64 {
        self.visit_count
    }

    pub fn visitors(&self) -> &[RobotId] {
        &self.visitors
    }
}
