//! TOOLKIT: beads issue tracking with session linking

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use beads_tracker::tags::linked_sessions;
use beads_tracker::{
    request, CreateIssue, IssueStatus, IssueTracker, SessionTag, StatusFilter, TrackerError,
    UpdateIssue,
};

use super::{ToolOutcome, ToolTrait};
use crate::ToolError;

const DESCRIPTION: &str = "Persistent, dependency-aware task tracking with git-backed storage.

Use beads to:
- Track work across sessions with `bd ready` (tasks with no open blockers)
- Create issues that persist beyond the current session
- Link discovered work to parent tasks with dependency tracking
- Claim tasks for the current session

Operations:
- ready: List tasks ready to work on (no open blockers)
- show: Show details of a specific issue
- create: Create a new issue
- update: Update an issue (status, title, notes, dependencies)
- close: Close an issue with optional summary
- claim: Claim an issue for the current session
- discover: Create a new issue linked to a parent (discovered-from)
- list: List all issues (optionally filtered)
- sessions: Show sessions linked to an issue";

const SESSIONS_HINT: &str =
    "Use 'amplifier session resume <session_id>' to revive a session for follow-up questions";

/// Beads operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Ready,
    Show,
    Create,
    Update,
    Close,
    Claim,
    Discover,
    List,
    Sessions,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::Ready,
        Operation::Show,
        Operation::Create,
        Operation::Update,
        Operation::Close,
        Operation::Claim,
        Operation::Discover,
        Operation::List,
        Operation::Sessions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Ready => "ready",
            Operation::Show => "show",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Close => "close",
            Operation::Claim => "claim",
            Operation::Discover => "discover",
            Operation::List => "list",
            Operation::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ToolError::UnknownOperation(s.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct BeadsArgs {
    issue_id: Option<String>,
    title: Option<String>,
    status: Option<IssueStatus>,
    notes: Option<String>,
    parent_id: Option<String>,
    blocks: Option<String>,
    blocked_by: Option<String>,
    filter_status: Option<StatusFilter>,
}

/// Non-empty value of a required argument
fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
    operation: Operation,
) -> Result<&'a str, ToolError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ToolError::MissingField {
            field,
            operation: operation.as_str(),
        })
}

fn tracker_error(err: TrackerError) -> ToolError {
    match err {
        TrackerError::NotInstalled(_) => ToolError::NotInstalled,
        other => ToolError::Tracker(other),
    }
}

/// Pretty-print JSON output, pass anything else through untouched
fn pretty(output: &str) -> String {
    match serde_json::from_str::<Value>(output) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| output.to_string()),
        Err(_) => output.to_string(),
    }
}

/// Agent-facing wrapper around the `bd` CLI
pub struct BeadsTool {
    tracker: Arc<dyn IssueTracker>,
    session_id: Option<String>,
}

impl BeadsTool {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self {
            tracker,
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Append a session marker to notes when a session is known
    fn tag_notes(&self, tag: SessionTag, notes: Option<&str>) -> Option<String> {
        match self.session_id.as_deref() {
            Some(sid) => Some(tag.append_to(notes, sid)),
            None => notes.filter(|n| !n.is_empty()).map(str::to_string),
        }
    }

    async fn bd(&self, args: Vec<String>) -> Result<String, ToolError> {
        self.tracker.run(args, true).await.map_err(tracker_error)
    }

    /// Run one operation against the tracker
    pub async fn run_operation(&self, operation: Operation, args: Value) -> Result<String, ToolError> {
        let args: BeadsArgs = serde_json::from_value(args)?;
        debug!("◆ BEADS {}", operation);

        match operation {
            Operation::Ready => Ok(pretty(&self.bd(request::ready()).await?)),
            Operation::Show => {
                let id = required(&args.issue_id, "issue_id", operation)?;
                Ok(pretty(&self.bd(request::show(id)).await?))
            }
            Operation::Create => {
                let title = required(&args.title, "title", operation)?;
                let req = CreateIssue {
                    notes: self.tag_notes(SessionTag::Created, args.notes.as_deref()),
                    blocked_by: args.blocked_by.clone(),
                    blocks: args.blocks.clone(),
                    ..CreateIssue::new(title)
                };
                Ok(pretty(&self.bd(req.to_args()).await?))
            }
            Operation::Update => {
                let id = required(&args.issue_id, "issue_id", operation)?;
                let req = UpdateIssue {
                    title: args.title.clone(),
                    status: args.status,
                    notes: args.notes.clone(),
                    blocked_by: args.blocked_by.clone(),
                    blocks: args.blocks.clone(),
                    ..UpdateIssue::new(id)
                };
                Ok(pretty(&self.bd(req.to_args()).await?))
            }
            Operation::Close => {
                let id = required(&args.issue_id, "issue_id", operation)?;
                let notes = self.tag_notes(SessionTag::ClosedIn, args.notes.as_deref());
                Ok(pretty(&self.bd(request::close(id, notes.as_deref())).await?))
            }
            Operation::Claim => {
                let id = required(&args.issue_id, "issue_id", operation)?;
                self.claim(id).await
            }
            Operation::Discover => {
                let title = required(&args.title, "title", operation)?;
                let parent = required(&args.parent_id, "parent_id", operation)?;
                let req = CreateIssue {
                    notes: self.tag_notes(SessionTag::DiscoveredIn, args.notes.as_deref()),
                    discovered_from: Some(parent.to_string()),
                    ..CreateIssue::new(title)
                };
                Ok(pretty(&self.bd(req.to_args()).await?))
            }
            Operation::List => {
                let filter = args.filter_status.unwrap_or_default();
                Ok(pretty(&self.bd(request::list(filter)).await?))
            }
            Operation::Sessions => {
                let id = required(&args.issue_id, "issue_id", operation)?;
                self.sessions(id).await
            }
        }
    }

    async fn claim(&self, id: &str) -> Result<String, ToolError> {
        let req = UpdateIssue {
            status: Some(IssueStatus::InProgress),
            notes: self
                .session_id
                .as_deref()
                .map(|sid| SessionTag::ClaimedBy.render(sid)),
            ..UpdateIssue::new(id)
        };
        let output = self.bd(req.to_args()).await?;

        match serde_json::from_str::<Value>(&output) {
            Ok(Value::Object(mut data)) => {
                data.insert("claimed_by_session".to_string(), json!(self.session_id));
                Ok(serde_json::to_string_pretty(&Value::Object(data))?)
            }
            _ => Ok(pretty(&output)),
        }
    }

    async fn sessions(&self, id: &str) -> Result<String, ToolError> {
        let issue = match self.tracker.show_issue(id).await {
            Ok(issue) => issue,
            Err(TrackerError::MalformedOutput(_)) => return Err(ToolError::ParseFailed),
            Err(e) => return Err(tracker_error(e)),
        };

        let sessions = linked_sessions(&issue.notes);
        let summary = json!({
            "issue_id": id,
            "session_count": sessions.len(),
            "linked_sessions": sessions,
            "hint": SESSIONS_HINT,
        });
        Ok(serde_json::to_string_pretty(&summary)?)
    }
}

#[async_trait]
impl ToolTrait for BeadsTool {
    fn name(&self) -> &str {
        "beads"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters(&self) -> Value {
        let operations: Vec<&str> = Operation::ALL.iter().map(Operation::as_str).collect();
        let statuses: Vec<&str> = IssueStatus::ALL.iter().map(IssueStatus::as_str).collect();
        let mut filters = statuses.clone();
        filters.push(StatusFilter::All.as_str());

        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": operations,
                    "description": "The beads operation to perform"
                },
                "issue_id": {
                    "type": "string",
                    "description": "Issue ID (e.g., 'bd-a1b2') - required for show, update, close, claim, sessions"
                },
                "title": {
                    "type": "string",
                    "description": "Issue title - required for create and discover, optional for update"
                },
                "status": {
                    "type": "string",
                    "enum": statuses,
                    "description": "Issue status - for update operation"
                },
                "notes": { "type": "string", "description": "Notes to add to the issue" },
                "parent_id": {
                    "type": "string",
                    "description": "Parent issue ID - for discover operation (creates discovered-from link)"
                },
                "blocks": {
                    "type": "string",
                    "description": "Comma-separated issue IDs that this issue blocks"
                },
                "blocked_by": {
                    "type": "string",
                    "description": "Comma-separated issue IDs that block this issue"
                },
                "filter_status": {
                    "type": "string",
                    "enum": filters,
                    "description": "Filter for list operation (default: open)"
                }
            },
            "required": ["operation"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutcome {
        if !self.tracker.is_available() {
            return Err(Box::new(ToolError::NotInstalled));
        }

        let operation = match args.get("operation").and_then(Value::as_str) {
            Some(op) if !op.is_empty() => op.parse::<Operation>()?,
            _ => return Err(Box::new(ToolError::MissingOperation)),
        };

        Ok(self.run_operation(operation, args).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_round_trip_names() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_operation() {
        let err = "explode".parse::<Operation>().unwrap_err();
        assert_eq!(err.code(), "unknown_operation");
        assert_eq!(err.to_string(), "Unknown operation: explode");
    }

    #[test]
    fn test_pretty_passes_text_through() {
        assert_eq!(pretty("Created bd-1"), "Created bd-1");
        assert_eq!(pretty(r#"{"id":"bd-1"}"#), "{\n  \"id\": \"bd-1\"\n}");
    }

    #[test]
    fn test_required_rejects_empty() {
        let err = required(&Some(String::new()), "title", Operation::Create).unwrap_err();
        assert_eq!(err.to_string(), "title required for create operation");
        assert!(required(&None, "issue_id", Operation::Show).is_err());
        assert_eq!(
            required(&Some("bd-1".to_string()), "issue_id", Operation::Show).unwrap(),
            "bd-1"
        );
    }
}
