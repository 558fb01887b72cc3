//! Configuration module for scrape runs
//!
//! This module provides the `ScrapeConfig` struct and its builder
//! for configuring scrape runs with validation and sensible defaults.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::{ConfigError, ScrapeConfigBuilder};
pub use types::{ScrapeConfig, ScrapeMode};
