//! Skill extraction: pattern engine, per-document extractor and batch scan

pub mod engine;
pub mod extractor;
pub mod orchestrator;
pub mod processor;

pub use engine::SkillEngine;
pub use extractor::{JobDocument, SkillExtractor, SkillScanner};
pub use orchestrator::{ScanOrchestrator, ScanOutcome};
pub use processor::{ScanSummary, SkillProcessor};
