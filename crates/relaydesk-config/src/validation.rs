// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::RelaydeskConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &RelaydeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        fail(format!(
            "server.log_level `{}` must be one of {}",
            config.server.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config
        .server
        .operator_token
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        fail("server.operator_token must not be empty when set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.session.ttl_secs == 0 {
        fail("session.ttl_secs must be greater than zero".to_string());
    }

    if config.agent.max_tool_rounds == 0 {
        fail("agent.max_tool_rounds must be at least 1".to_string());
    }

    if config.agent.search_limit == 0 {
        fail("agent.search_limit must be at least 1".to_string());
    }

    if config.agent.watch_interval_ms < 100 {
        fail(format!(
            "agent.watch_interval_ms must be at least 100, got {}",
            config.agent.watch_interval_ms
        ));
    }

    if !config.groq.base_url.starts_with("http://") && !config.groq.base_url.starts_with("https://")
    {
        fail(format!(
            "groq.base_url `{}` must be an http(s) URL",
            config.groq.base_url
        ));
    }

    let prefix = &config.billing.code_prefix;
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        fail(format!(
            "billing.code_prefix `{prefix}` must be non-empty ASCII alphanumerics"
        ));
    }

    let mut seen = HashSet::new();
    for plan in &config.billing.plans {
        if plan.name.trim().is_empty() {
            fail("billing.plans entries must have a name".to_string());
        } else if !seen.insert(plan.name.as_str()) {
            fail(format!("billing.plans has duplicate plan `{}`", plan.name));
        }
        if plan.amount <= 0 {
            fail(format!(
                "billing.plans `{}` amount must be positive, got {}",
                plan.name, plan.amount
            ));
        }
        if plan.interval != "month" && plan.interval != "year" {
            fail(format!(
                "billing.plans `{}` interval must be `month` or `year`, got `{}`",
                plan.name, plan.interval
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlanConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RelaydeskConfig::default()).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = RelaydeskConfig::default();
        config.storage.database_path = "  ".into();
        config.session.ttl_secs = 0;
        config.agent.max_tool_rounds = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn duplicate_and_unpriced_plans_are_rejected() {
        let mut config = RelaydeskConfig::default();
        config.billing.plans = vec![
            PlanConfig {
                name: "pro".into(),
                amount: 10_000,
                interval: "month".into(),
            },
            PlanConfig {
                name: "pro".into(),
                amount: 0,
                interval: "week".into(),
            },
        ];
        let errors = validate_config(&config).unwrap_err();
        let text: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(text.iter().any(|m| m.contains("duplicate plan `pro`")));
        assert!(text.iter().any(|m| m.contains("amount must be positive")));
        assert!(text.iter().any(|m| m.contains("`month` or `year`")));
    }

    #[test]
    fn code_prefix_must_be_alphanumeric() {
        let mut config = RelaydeskConfig::default();
        config.billing.code_prefix = "RD-".into();
        assert!(validate_config(&config).is_err());
    }
}
