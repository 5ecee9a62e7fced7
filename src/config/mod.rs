//! Configuration module for the Discovery Engine
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use discovery_engine::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("explore.toml")).unwrap();
//! println!("Exploration will record at most {} pages", config.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ExplorationConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
