//! Rendering of command results

pub mod formatter;

pub use formatter::{ConsoleFormatter, JsonFormatter, OutputFormatter, Report, ReportGenerator};
