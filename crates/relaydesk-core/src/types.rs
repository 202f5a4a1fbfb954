// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the storage, agent, billing and gateway crates.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Generator,
    Knowledge,
}

// --- Enumerations ---

/// Ownership state of a conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConversationStatus {
    /// Initial state; the AI may answer.
    Unresolved,
    /// A human operator should respond.
    Escalated,
    /// Closed; message writes are rejected.
    Resolved,
}

impl ConversationStatus {
    /// The next status in the operator cycle
    /// `unresolved -> escalated -> resolved -> unresolved`.
    pub fn next(self) -> Self {
        match self {
            Self::Unresolved => Self::Escalated,
            Self::Escalated => Self::Resolved,
            Self::Resolved => Self::Unresolved,
        }
    }
}

/// Author role of a ledger message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

/// Whether a payment opens a new subscription or extends the existing one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentType {
    SubscriptionCreation,
    SubscriptionRenewal,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Qr,
    CreditCard,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
    Unpaid,
}

/// Billing interval. Periods are calendar-naive fixed durations.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BillingInterval {
    #[default]
    Month,
    Year,
}

impl BillingInterval {
    /// `month` is 30 days, `year` is 365 days.
    pub fn period(self) -> TimeDelta {
        match self {
            Self::Month => TimeDelta::days(30),
            Self::Year => TimeDelta::days(365),
        }
    }
}

// --- Records ---

/// Browser details captured by the widget when a session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceMetadata {
    pub user_agent: Option<String>,
    pub language: Option<String>,
    pub languages: Vec<String>,
    pub vendor: Option<String>,
    pub platform: Option<String>,
    pub screen_resolution: Option<String>,
    pub viewport_size: Option<String>,
    pub timezone: Option<String>,
    pub timezone_offset: Option<i32>,
    pub cookie_enabled: Option<bool>,
    pub referrer: Option<String>,
    pub current_url: Option<String>,
}

/// An anonymous visitor identity scoped to one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSession {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub metadata: DeviceMetadata,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ContactSession {
    /// A session is valid up to and including its expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Cached preview of the most recent user or assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMessage {
    pub text: String,
    pub role: MessageRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub tenant_id: String,
    pub contact_session_id: String,
    pub thread_id: String,
    pub status: ConversationStatus,
    pub last_message: Option<LastMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A conversation joined with the visitor session that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationWithContact {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub contact_session: Option<ContactSession>,
}

/// An immutable entry in a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    /// Ledger-assigned insertion sequence; breaks creation-time ties.
    pub seq: i64,
    pub role: MessageRole,
    pub text: String,
    /// Operator or agent display name for assistant messages.
    pub author_name: Option<String>,
    /// Tool name for tool-authored messages.
    pub tool_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A message about to be appended; the ledger assigns the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub author_name: Option<String>,
    pub tool_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    pub fn new(role: MessageRole, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            author_name: None,
            tool_name: None,
            created_at,
        }
    }

    pub fn authored_by(mut self, name: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool_name = Some(tool.into());
        self
    }
}

/// A pre-registered expected payment, matched later by `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub tenant_id: String,
    pub code: String,
    pub amount: i64,
    pub currency: String,
    pub payment_type: PaymentType,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub plan: String,
    pub interval: BillingInterval,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub tenant_id: String,
    pub plan: String,
    pub status: SubscriptionStatus,
    pub interval: BillingInterval,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Active status and `now` still inside the paid period.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && now <= self.current_period_end
    }
}

/// Result of settling a payment code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub intent: PaymentIntent,
    pub subscription: Option<Subscription>,
    /// False when the intent was already settled and nothing changed.
    pub applied: bool,
}

/// Per-tenant widget bootstrap settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub tenant_id: String,
    pub greeting_message: String,
    pub suggestions: Vec<String>,
    pub theme: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant-scoped operator identity supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorIdentity {
    pub tenant_id: String,
    pub operator_id: String,
    pub display_name: String,
}

// --- Pagination ---

/// Keyset pagination request. `cursor` is opaque to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub limit: usize,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 100;

    pub fn first(limit: usize) -> Self {
        Self {
            cursor: None,
            limit,
        }
    }

    /// Limit clamped into `1..=MAX_LIMIT`, with 0 meaning the default.
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            0 => Self::DEFAULT_LIMIT,
            n => n.min(Self::MAX_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub is_done: bool,
}

/// Status side effect applied in the same transaction as a message write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Keep,
    Set(ConversationStatus),
    /// Move `unresolved` to `escalated`; leave other states alone.
    EscalateIfUnresolved,
}

impl StatusChange {
    pub fn apply(self, current: ConversationStatus) -> ConversationStatus {
        match self {
            Self::Keep => current,
            Self::Set(status) => status,
            Self::EscalateIfUnresolved if current == ConversationStatus::Unresolved => {
                ConversationStatus::Escalated
            }
            Self::EscalateIfUnresolved => current,
        }
    }
}

/// One atomic write: messages appended to a thread plus a status effect.
#[derive(Debug, Clone)]
pub struct TurnCommit {
    pub conversation_id: String,
    pub messages: Vec<NewMessage>,
    pub status: StatusChange,
    pub now: DateTime<Utc>,
}
