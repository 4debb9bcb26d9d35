// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./crossway.toml` > `~/.config/crossway/crossway.toml`
//! > `/etc/crossway/crossway.toml`, with environment variable overrides via the
//! `CROSSWAY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CrosswayConfig;

/// Config sections addressable from the environment.
///
/// Longest names first so `multi_agent_command` is not claimed by a shorter section.
const ENV_SECTIONS: &[&str] = &[
    "multi_agent",
    "retrieval",
    "routing",
    "session",
    "storage",
    "hosted",
    "agent",
    "local",
];

/// Path of the system-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/crossway/crossway.toml";

/// Path of the config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "crossway.toml";

/// Returns the user config path under the XDG config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("crossway").join("crossway.toml"))
}

/// Build the layered Figment.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/crossway/crossway.toml`
/// 3. `~/.config/crossway/crossway.toml`
/// 4. `./crossway.toml`
/// 5. `explicit`, when given
/// 6. `CROSSWAY_*` environment variables
pub fn build_figment(explicit: Option<&Path>) -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(CrosswayConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment = figment.merge(Toml::file(LOCAL_CONFIG_PATH));
    if let Some(path) = explicit {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<CrosswayConfig, figment::Error> {
    build_figment(explicit).extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CrosswayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CrosswayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` because both section and
/// key names contain underscores: `CROSSWAY_MULTI_AGENT_COMMAND` must map to
/// `multi_agent.command`, and `CROSSWAY_SESSION_BACKEND_TIMEOUT_SECS` to
/// `session.backend_timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("CROSSWAY_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        let rest = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            .filter(|r| !r.is_empty());
        if let Some(rest) = rest {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
