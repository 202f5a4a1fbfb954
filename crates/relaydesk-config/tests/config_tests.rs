// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Relaydesk configuration system.

use relaydesk_config::diagnostic::ConfigError;
use relaydesk_config::model::RelaydeskConfig;
use relaydesk_config::{load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 8080
log_level = "debug"
operator_token = "op-token"

[storage]
database_path = "/tmp/relaydesk.db"
wal_mode = false

[session]
ttl_secs = 3600

[agent]
name = "Echo"
max_tool_rounds = 2
handoff_after_reply = false

[groq]
api_key = "gsk-123"
model = "llama-3.3-70b-versatile"

[webhook]
api_key = "sepay-key"

[billing]
currency = "VND"
code_prefix = "ECHO"
account_number = "0344927528"

[[billing.plans]]
name = "pro"
amount = 10000
interval = "month"

[[billing.plans]]
name = "pro-annual"
amount = 100000
interval = "year"

[widget]
default_greeting = "Hello there"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.operator_token.as_deref(), Some("op-token"));
    assert!(!config.storage.wal_mode);
    assert_eq!(config.session.ttl_secs, 3600);
    assert_eq!(config.agent.name, "Echo");
    assert!(!config.agent.handoff_after_reply);
    assert_eq!(config.groq.api_key.as_deref(), Some("gsk-123"));
    assert_eq!(config.webhook.api_key.as_deref(), Some("sepay-key"));
    assert_eq!(config.billing.plans.len(), 2);
    assert_eq!(config.billing.plans[1].interval, "year");
    assert_eq!(config.widget.default_greeting, "Hello there");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.session.ttl_secs, 86_400);
    assert_eq!(config.agent.max_tool_rounds, 4);
    assert!(config.agent.handoff_after_reply);
    assert_eq!(config.groq.model, "moonshotai/kimi-k2-instruct-0905");
    assert_eq!(config.billing.plans[0].amount, 10_000);
    assert!(config.webhook.api_key.is_none());
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[session]
ttl_sec = 60
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "ttl_sec");
            assert_eq!(suggestion.as_deref(), Some("ttl_secs"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "server.port"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str("[session]\nttl_secs = 0\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn debug_output_redacts_secrets() {
    let mut config = RelaydeskConfig::default();
    config.groq.api_key = Some("gsk-live-secret".into());
    config.webhook.api_key = Some("hook-secret".into());
    config.server.operator_token = Some("op-secret".into());
    let debug = format!("{config:?}");
    assert!(!debug.contains("gsk-live-secret"));
    assert!(!debug.contains("hook-secret"));
    assert!(!debug.contains("op-secret"));
    assert!(debug.contains("[REDACTED]"));
}
