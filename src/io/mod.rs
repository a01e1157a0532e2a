pub mod loader;
pub mod writer;

// Re-export commonly used types
pub use loader::{load_dir, load_dwell_table, LoadError, DWELL_FILE};
pub use writer::{summary_lines, write_report, WriteError};
