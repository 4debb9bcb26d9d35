// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Crossway prompt router.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use crossway_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("word threshold: {}", config.routing.word_threshold);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_str};
pub use model::CrosswayConfig;

/// Load configuration from the file hierarchy and environment, then validate it.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<CrosswayConfig, Vec<ConfigError>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(vec![ConfigError::Other(format!(
                "config file {} does not exist",
                path.display()
            ))]);
        }
    }
    let config = loader::load_config(explicit).map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<CrosswayConfig, Vec<ConfigError>> {
    let config =
        loader::load_config_from_str(toml_content).map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}
