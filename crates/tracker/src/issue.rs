//! Issue model as emitted by `bd --json`

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Issue status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Blocked,
    Closed,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Open,
        IssueStatus::InProgress,
        IssueStatus::Blocked,
        IssueStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Blocked => "blocked",
            IssueStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status filter for listing, `All` drops the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    Open,
    InProgress,
    Blocked,
    Closed,
    All,
}

impl StatusFilter {
    pub fn status(&self) -> Option<IssueStatus> {
        match self {
            StatusFilter::Open => Some(IssueStatus::Open),
            StatusFilter::InProgress => Some(IssueStatus::InProgress),
            StatusFilter::Blocked => Some(IssueStatus::Blocked),
            StatusFilter::Closed => Some(IssueStatus::Closed),
            StatusFilter::All => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.status().map_or("all", |status| status.as_str())
    }
}

/// A beads issue.
///
/// Only the fields the module reads are typed; `bd` emits many more and they
/// are ignored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default = "unknown_id", deserialize_with = "id_or_unknown")]
    pub id: String,
    #[serde(default = "untitled", deserialize_with = "title_or_untitled")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Number in current `bd` releases, string in older ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

fn unknown_id() -> String {
    "?".to_string()
}

fn untitled() -> String {
    "Untitled".to_string()
}

// `bd` writes null for unset text fields; read it like a missing key.

fn id_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_id))
}

fn title_or_untitled<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(untitled))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Issue {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: None,
            priority: None,
            notes: String::new(),
        }
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Value>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Priority as display text, empty values read as none
    pub fn priority_label(&self) -> Option<String> {
        match self.priority.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// List output comes bare from current `bd` and wrapped from older releases
#[derive(Deserialize)]
#[serde(untagged)]
enum IssueListPayload {
    Bare(Vec<Issue>),
    Wrapped {
        #[serde(default)]
        issues: Vec<Issue>,
    },
}

/// Parse `bd ready --json` / `bd list --json` output
pub fn parse_issue_list(output: &str) -> serde_json::Result<Vec<Issue>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }
    let issues = match serde_json::from_str(output)? {
        IssueListPayload::Bare(issues) => issues,
        IssueListPayload::Wrapped { issues } => issues,
    };
    Ok(issues)
}

/// Parse `bd show --json` output, which some releases wrap in a one-element array
pub fn parse_issue(output: &str) -> serde_json::Result<Issue> {
    match serde_json::from_str::<Value>(output)? {
        Value::Array(mut items) if !items.is_empty() => serde_json::from_value(items.remove(0)),
        other => serde_json::from_value(other),
    }
}
