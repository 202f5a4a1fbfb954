// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Relaydesk support desk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Relaydesk configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelaydeskConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Visitor session lifetime.
    #[serde(default)]
    pub session: SessionConfig,

    /// Support agent behavior.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Groq (OpenAI-compatible) text generation settings.
    #[serde(default)]
    pub groq: GroqConfig,

    /// Bank-transfer webhook settings.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Plans, payment codes and QR settings.
    #[serde(default)]
    pub billing: BillingConfig,

    #[serde(default)]
    pub widget: WidgetConfig,
}

/// HTTP server configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Bearer token required on operator routes. Operator routes are
    /// disabled when unset.
    #[serde(default)]
    pub operator_token: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field(
                "operator_token",
                &self.operator_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            operator_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    90
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("relaydesk").join("relaydesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("relaydesk.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Contact session lifetime, extended on every visitor message.
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

/// Support agent configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name recorded on AI-authored messages.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Replaces the built-in support prompt when set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Generation rounds allowed per visitor turn before giving up.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    /// Prior thread messages sent as context.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Passages returned by one knowledge search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Escalate an unresolved conversation after the AI replies.
    #[serde(default = "default_handoff_after_reply")]
    pub handoff_after_reply: bool,

    /// Poll interval for conversation watch streams.
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            system_prompt: None,
            max_tool_rounds: default_max_tool_rounds(),
            history_limit: default_history_limit(),
            search_limit: default_search_limit(),
            handoff_after_reply: default_handoff_after_reply(),
            watch_interval_ms: default_watch_interval_ms(),
        }
    }
}

fn default_agent_name() -> String {
    "Support Agent".to_string()
}

fn default_max_tool_rounds() -> usize {
    4
}

fn default_history_limit() -> usize {
    30
}

fn default_search_limit() -> usize {
    5
}

fn default_handoff_after_reply() -> bool {
    true
}

fn default_watch_interval_ms() -> u64 {
    1000
}

/// Groq chat-completions configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroqConfig {
    /// Without a key, eligible turns degrade to awaiting a human.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_groq_base_url")]
    pub base_url: String,

    #[serde(default = "default_groq_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_groq_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_groq_base_url(),
            model: default_groq_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_groq_timeout_secs(),
        }
    }
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "moonshotai/kimi-k2-instruct-0905".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_groq_timeout_secs() -> u64 {
    60
}

/// Bank-transfer webhook configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Shared secret expected in `Authorization: Apikey <secret>`.
    /// Every webhook call is rejected when unset.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Billing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BillingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Prefix of generated payment codes.
    #[serde(default = "default_code_prefix")]
    pub code_prefix: String,

    /// Bank identifier used in QR image URLs.
    #[serde(default = "default_bank_id")]
    pub bank_id: String,

    /// Receiving account number used in QR image URLs.
    #[serde(default)]
    pub account_number: String,

    #[serde(default = "default_qr_template")]
    pub qr_template: String,

    #[serde(default = "default_qr_base_url")]
    pub qr_base_url: String,

    /// Paid plans offered to tenants.
    #[serde(default = "default_plans")]
    pub plans: Vec<PlanConfig>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            code_prefix: default_code_prefix(),
            bank_id: default_bank_id(),
            account_number: String::new(),
            qr_template: default_qr_template(),
            qr_base_url: default_qr_base_url(),
            plans: default_plans(),
        }
    }
}

fn default_currency() -> String {
    "VND".to_string()
}

fn default_code_prefix() -> String {
    "RD".to_string()
}

fn default_bank_id() -> String {
    "MB".to_string()
}

fn default_qr_template() -> String {
    "qr_only".to_string()
}

fn default_qr_base_url() -> String {
    "https://img.vietqr.io/image".to_string()
}

fn default_plans() -> Vec<PlanConfig> {
    vec![PlanConfig {
        name: "pro".to_string(),
        amount: 10_000,
        interval: "month".to_string(),
    }]
}

/// A paid plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    pub name: String,
    /// Price per interval in the smallest currency unit.
    pub amount: i64,
    /// `month` or `year`.
    #[serde(default = "default_plan_interval")]
    pub interval: String,
}

fn default_plan_interval() -> String {
    "month".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetConfig {
    /// Greeting used when a tenant has no widget settings.
    #[serde(default = "default_greeting")]
    pub default_greeting: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            default_greeting: default_greeting(),
        }
    }
}

fn default_greeting() -> String {
    "Hi! How can I help you today?".to_string()
}
