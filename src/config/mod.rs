//! Configuration module for Wallpaper Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A run without a config file uses the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use wallpaper_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Gallery: {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DelayConfig, DelayRange, HttpConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
