pub mod core;
pub mod io;

// Re-export commonly used types
pub use crate::core::builder::{PlatformSpec, RobotSpec, Simulation};
pub use crate::core::errors::{BlockedRobot, ConfigError, SimError};
pub use crate::core::execution::{ConcurrencyMode, DwellPolicy, Scheduler, SchedulerConfig, TickObserver};
pub use crate::core::report::{Outcome, SimulationReport};
pub use crate::core::types::{Kind, PlatformId, RobotId, Tick};
