pub mod config;
pub mod scheduler;

// Re-export commonly used types
pub use config::{ConcurrencyMode, DwellPolicy, SchedulerConfig};
pub use scheduler::{Scheduler, TickObserver};
