// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Hierarchy: `./relaydesk.toml` > `~/.config/relaydesk/relaydesk.toml` >
//! `/etc/relaydesk/relaydesk.toml`, with `RELAYDESK_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RelaydeskConfig;

pub(crate) const LOCAL_CONFIG: &str = "relaydesk.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/relaydesk/relaydesk.toml";

/// Top-level sections, used to turn `RELAYDESK_GROQ_API_KEY` into `groq.api_key`.
const SECTIONS: &[&str] = &[
    "server", "storage", "session", "agent", "groq", "webhook", "billing", "widget",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("relaydesk").join(LOCAL_CONFIG))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/relaydesk/relaydesk.toml`
/// 3. `~/.config/relaydesk/relaydesk.toml`
/// 4. `./relaydesk.toml`
/// 5. `RELAYDESK_*` environment variables
pub fn load_config() -> Result<RelaydeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RelaydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RelaydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full hierarchy before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Env provider mapping the first `<section>_` to `<section>.`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `RELAYDESK_AGENT_MAX_TOOL_ROUNDS` is `agent.max_tool_rounds`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("RELAYDESK_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or_else(|| key.to_string())
}
