//! HOOK BUS: Session lifecycle events
//!
//! Event envelopes delivered by the host, the results hooks hand back, and a
//! small in-process dispatcher that routes events to subscribed handlers.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Lifecycle event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    SessionStart,
    SessionEnd,
    ToolCallCompleted,
    BeforeLlmRequest,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::SessionStart,
        EventKind::SessionEnd,
        EventKind::ToolCallCompleted,
        EventKind::BeforeLlmRequest,
    ];

    /// Host event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SessionStart => "session:start",
            EventKind::SessionEnd => "session:end",
            EventKind::ToolCallCompleted => "tool:post",
            EventKind::BeforeLlmRequest => "provider:request",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    SessionStart,
    SessionEnd,
    ToolCallCompleted { tool_name: String },
    BeforeLlmRequest,
}

/// Event delivered by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookEvent {
    /// Session the event belongs to
    pub session_id: String,
    pub payload: EventPayload,
    pub timestamp: DateTime<Local>,
    /// Host-supplied extras
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl HookEvent {
    pub fn new(session_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            session_id: session_id.into(),
            payload,
            timestamp: Local::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn session_start(session_id: impl Into<String>) -> Self {
        Self::new(session_id, EventPayload::SessionStart)
    }

    pub fn session_end(session_id: impl Into<String>) -> Self {
        Self::new(session_id, EventPayload::SessionEnd)
    }

    pub fn tool_call_completed(
        session_id: impl Into<String>,
        tool_name: impl Into<String>,
    ) -> Self {
        Self::new(
            session_id,
            EventPayload::ToolCallCompleted {
                tool_name: tool_name.into(),
            },
        )
    }

    pub fn before_llm_request(session_id: impl Into<String>) -> Self {
        Self::new(session_id, EventPayload::BeforeLlmRequest)
    }

    /// Add host metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), value);
        }
        self
    }

    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::SessionStart => EventKind::SessionStart,
            EventPayload::SessionEnd => EventKind::SessionEnd,
            EventPayload::ToolCallCompleted { .. } => EventKind::ToolCallCompleted,
            EventPayload::BeforeLlmRequest => EventKind::BeforeLlmRequest,
        }
    }

    /// Tool name for `tool:post` events
    pub fn tool_name(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::ToolCallCompleted { tool_name } => Some(tool_name),
            _ => None,
        }
    }
}

/// Role attributed to injected context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextRole {
    #[default]
    System,
    User,
}

/// What a hook asks the host to do
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HookResult {
    /// Text to add to the conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_injection: Option<String>,
    #[serde(default)]
    pub role: ContextRole,
    /// Not persisted in the durable history
    #[serde(default)]
    pub ephemeral: bool,
}

impl HookResult {
    /// Nothing to inject
    pub fn none() -> Self {
        Self::default()
    }

    pub fn inject(content: impl Into<String>) -> Self {
        Self {
            context_injection: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn with_role(mut self, role: ContextRole) -> Self {
        self.role = role;
        self
    }

    pub fn has_injection(&self) -> bool {
        self.context_injection
            .as_deref()
            .is_some_and(|text| !text.is_empty())
    }
}

/// Lifecycle hook
#[async_trait]
pub trait HookHandler: Send + Sync {
    fn name(&self) -> &str;
    async fn handle(&self, event: &HookEvent) -> HookResult;
}

/// Routes events to the handlers subscribed to their kind
#[derive(Default)]
pub struct HookBus {
    handlers: HashMap<EventKind, Vec<Arc<dyn HookHandler>>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Arc<dyn HookHandler>) {
        debug!("◆ HOOK {} SUBSCRIBED TO {}", handler.name(), kind);
        self.handlers.entry(kind).or_default().push(handler);
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to its subscribers in subscription order.
    ///
    /// Returns only the results that carry context to inject.
    pub async fn emit(&self, event: &HookEvent) -> Vec<HookResult> {
        let kind = event.kind();
        let Some(handlers) = self.handlers.get(&kind) else {
            trace!("◆ NO HOOKS FOR {}", kind);
            return Vec::new();
        };

        let mut results = Vec::new();
        for handler in handlers {
            trace!("◆ {} -> {}", kind, handler.name());
            let result = handler.handle(event).await;
            if result.has_injection() {
                results.push(result);
            }
        }
        results
    }
}

impl fmt::Debug for HookBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (kind.as_str(), handlers.len()))
            .collect();
        f.debug_struct("HookBus").field("handlers", &counts).finish()
    }
}
