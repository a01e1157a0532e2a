use crate::core::errors::{BlockedRobot, ConfigError, SimError};
use crate::core::execution::config::{ConcurrencyMode, SchedulerConfig};
use crate::core::platform::Platform;
use crate::core::report::{Outcome, PlatformResult, RobotResult, SimulationReport};
use crate::core::robot::{Intent, Robot, RobotState};
use crate::core::types::{PlatformId, RobotId, Tick};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Observer trait for scheduler ticks
pub trait TickObserver {
    /// Called after every robot has been evaluated for `tick`, before termination is decided
    fn on_tick_complete(&mut self, tick: Tick, scheduler: &Scheduler);
}

/// Owns all simulation state and drives the tick loop.
///
/// Each tick runs in two phases. In the prepare phase every unfinished robot
/// charges the tick to itself and works out its intent; this touches only that
/// robot, so it may run in parallel. In the admission phase intents are applied
/// through [`Platform::try_enter`] and [`Platform::leave`] strictly in ascending
/// robot id, so the lower id wins when robots contend for the last free slot.
pub struct Scheduler {
    platforms: BTreeMap<PlatformId, Platform>,
    /// Ascending by id
    robots: Vec<Robot>,
    config: SchedulerConfig,
    pool: Option<rayon::ThreadPool>,
    current_tick: Tick,
    outcome: Option<Outcome>,
    fault: Option<SimError>,
    observers: Vec<Box<dyn TickObserver>>,
}

impl Scheduler {
    /// Platforms and robots are expected to be validated already; see
    /// [`Simulation::build`](crate::core::builder::simulation_builder::Simulation::build).
    pub(crate) fn new(
        platforms: BTreeMap<PlatformId, Platform>,
        mut robots: Vec<Robot>,
        config: SchedulerConfig,
    ) -> Result<Self, SimError> {
        config.validate()?;
        robots.sort_by_key(Robot::id);

        let pool = match (config.concurrency_mode, config.thread_pool_size) {
            (ConcurrencyMode::Rayon, Some(size)) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(size)
                    .build()
                    .map_err(|e| ConfigError::ThreadPool(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(Self {
            platforms,
            robots,
            config,
            pool,
            current_tick: 0,
            outcome: None,
            fault: None,
            observers: Vec::new(),
        })
    }

    /// Add an observer notified after every tick
    pub fn add_observer(&mut self, observer: Box<dyn TickObserver>) {
        self.observers.push(observer);
    }

    /// Run until every robot is done. Returns the final tick.
    pub fn run(&mut self) -> Result<Tick, SimError> {
        if self.current_tick == 0 {
            info!(
                "Starting run: {} robots, {} platforms, dwell {:?}, {:?}",
                self.robots.len(),
                self.platforms.len(),
                self.config.dwell,
                self.config.concurrency_mode
            );
        }
        while self.step()? {}
        Ok(self.current_tick)
    }

    /// Execute one tick. Returns `Ok(true)` while robots remain unfinished.
    ///
    /// Once the run has terminated, further calls return the same result
    /// again without advancing time.
    pub fn step(&mut self) -> Result<bool, SimError> {
        if let Some(result) = self.terminal_result() {
            return result.map(|_| false);
        }
        if self.robots.iter().all(Robot::is_done) {
            return Ok(self.finish());
        }

        self.current_tick += 1;
        let tick = self.current_tick;
        debug!("=== Tick {} ===", tick);

        let before: Vec<_> = self.robots.iter().map(Robot::progress).collect();
        let intents = self.prepare_robots();
        for (index, intent) in intents.into_iter().enumerate() {
            if let Err(err) = self.apply_intent(index, intent) {
                return Err(self.fail(err));
            }
        }
        if let Err(err) = self.verify_occupancy() {
            return Err(self.fail(err));
        }
        let progressed = self
            .robots
            .iter()
            .zip(&before)
            .any(|(robot, before)| robot.progress() != *before);

        self.notify_tick_complete(tick);

        if self.robots.iter().all(Robot::is_done) {
            return Ok(self.finish());
        }

        if !progressed {
            let blocked = self.blocked_robots();
            warn!("Deadlock at tick {}: {} robots blocked", tick, blocked.len());
            for entry in &blocked {
                warn!("  {}", entry);
            }
            self.outcome = Some(Outcome::Deadlock {
                blocked: blocked.clone(),
            });
            return Err(SimError::Deadlock { tick, blocked });
        }

        if let Some(max_ticks) = self.config.max_ticks {
            if tick >= max_ticks {
                warn!("Tick limit {} reached with robots still running", max_ticks);
                self.outcome = Some(Outcome::TickLimitReached);
                return Err(SimError::TickLimitReached { max_ticks });
            }
        }

        Ok(true)
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Robots in evaluation order.
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots
            .binary_search_by_key(&id, Robot::id)
            .ok()
            .map(|index| &self.robots[index])
    }

    pub fn platforms(&self) -> impl Iterator<Item = &Platform> + '_ {
        self.platforms.values()
    }

    pub fn platform(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.get(&id)
    }

    /// Snapshot of completion times and visit counts.
    ///
    /// Robots that have not finished are reported with `completed: false`.
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            outcome: self.outcome.clone(),
            final_tick: self.current_tick,
            robots: self
                .robots
                .iter()
                .map(|robot| RobotResult {
                    robot_id: robot.id(),
                    total_time: robot.ticks_elapsed(),
                    completed: robot.is_done(),
                })
                .collect(),
            platforms: self
                .platforms
                .values()
                .map(|platform| PlatformResult {
                    platform_id: platform.id(),
                    visit_count: platform.visit_count(),
                    visitors: platform.visitors().to_vec(),
                })
                .collect(),
        }
    }

    fn prepare_robots(&mut self) -> Vec<Intent> {
        let robots = &mut self.robots;
        match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => robots.iter_mut().map(Robot::prepare).collect(),
            ConcurrencyMode::Rayon => match &self.pool {
                Some(pool) => pool.install(|| robots.par_iter_mut().map(Robot::prepare).collect()),
                None => robots.par_iter_mut().map(Robot::prepare).collect(),
            },
        }
    }

    fn apply_intent(&mut self, index: usize, intent: Intent) -> Result<(), SimError> {
        let robot = &mut self.robots[index];
        match intent {
            Intent::Idle => Ok(()),
            Intent::Request(platform_id) => {
                let platform = self
                    .platforms
                    .get_mut(&platform_id)
                    .ok_or_else(|| missing_platform(platform_id))?;
                if !platform.try_enter(robot.id()) {
                    debug!(
                        "Robot {} waiting on platform {} ({}/{})",
                        robot.id(),
                        platform_id,
                        platform.occupancy(),
                        platform.capacity()
                    );
                    return Ok(());
                }
                let dwell = self.config.dwell.dwell_for(robot.kind(), platform.kind());
                debug!(
                    "Robot {} entered platform {} for {} ticks",
                    robot.id(),
                    platform_id,
                    dwell
                );
                if let Some(previous) = robot.admitted(platform_id, dwell) {
                    self.platforms
                        .get_mut(&previous)
                        .ok_or_else(|| missing_platform(previous))?
                        .leave(robot.id())?;
                }
                Ok(())
            }
            Intent::Finish(platform_id) => {
                self.platforms
                    .get_mut(&platform_id)
                    .ok_or_else(|| missing_platform(platform_id))?
                    .leave(robot.id())?;
                robot.finished();
                debug!(
                    "Robot {} finished at tick {}",
                    robot.id(),
                    robot.ticks_elapsed()
                );
                Ok(())
            }
        }
    }

    /// Cross-check platform occupancy against what the robots believe they hold.
    fn verify_occupancy(&self) -> Result<(), SimError> {
        for platform in self.platforms.values() {
            if platform.occupancy() > platform.capacity() {
                return Err(SimError::InvariantViolation(format!(
                    "platform {} holds {} robots with capacity {}",
                    platform.id(),
                    platform.occupancy(),
                    platform.capacity()
                )));
            }
            for occupant in platform.occupants() {
                let holds = self
                    .robot(occupant)
                    .map_or(false, |robot| robot.held() == Some(platform.id()));
                if !holds {
                    return Err(SimError::InvariantViolation(format!(
                        "platform {} lists robot {} which does not hold it",
                        platform.id(),
                        occupant
                    )));
                }
            }
        }
        Ok(())
    }

    fn blocked_robots(&self) -> Vec<BlockedRobot> {
        self.robots
            .iter()
            .filter(|robot| robot.state() == RobotState::Requesting)
            .filter_map(|robot| {
                robot.target().map(|waiting_on| BlockedRobot {
                    robot: robot.id(),
                    waiting_on,
                    holding: robot.held(),
                })
            })
            .collect()
    }

    fn finish(&mut self) -> bool {
        info!("All robots done at tick {}", self.current_tick);
        self.outcome = Some(Outcome::AllDone);
        false
    }

    fn fail(&mut self, err: SimError) -> SimError {
        warn!("Run aborted at tick {}: {}", self.current_tick, err);
        self.fault = Some(err.clone());
        err
    }

    fn terminal_result(&self) -> Option<Result<(), SimError>> {
        if let Some(fault) = &self.fault {
            return Some(Err(fault.clone()));
        }
        self.outcome.as_ref().map(|outcome| match outcome {
            Outcome::AllDone => Ok(()),
            Outcome::Deadlock { blocked } => Err(SimError::Deadlock {
                tick: self.current_tick,
                blocked: blocked.clone(),
            }),
            Outcome::TickLimitReached => Err(SimError::TickLimitReached {
                max_ticks: self.config.max_ticks.unwrap_or(self.current_tick),
            }),
        })
    }

    fn notify_tick_complete(&mut self, tick: Tick) {
        let mut observers = std::mem::take(&mut self.observers);
        for observer in &mut observers {
            observer.on_tick_complete(tick, self);
        }
        self.observers = observers;
    }
}

fn missing_platform(platform: PlatformId) -> SimError {
    SimError::InvariantViolation(format!("platform {} is not registered", platform))
}
