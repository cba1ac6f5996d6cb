//! Configuration module for SplitShare
//!
//! This module provides configuration management including:
//! - data directory resolution
//! - user settings persistence

pub mod paths;
pub mod settings;

pub use paths::SplitPaths;
pub use settings::{RateSettings, Settings};
