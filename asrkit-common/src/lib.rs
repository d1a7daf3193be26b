//! # asrkit Common Library
//!
//! Shared code for the asrkit crates:
//! - Error and result types
//! - Configuration loading and resolution

pub mod config;
pub mod error;

pub use config::{AsrkitConfig, CorpusConfig, LoggingConfig};
pub use error::{Error, Result};
