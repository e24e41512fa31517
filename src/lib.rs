//! Job market analyzer library

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod input;
pub mod output;
pub mod profile;
pub mod service;
pub mod storage;
pub mod vocabulary;

pub use config::Config;
pub use error::{AnalyzerError, Result};
