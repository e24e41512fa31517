//! Consumer-facing features built on the stored corpus

pub mod dashboard;
pub mod pipeline;

pub use dashboard::{DashboardService, DashboardStats};
pub use pipeline::{AnalysisDetails, CvAnalysisReport, CvAnalyzer};
