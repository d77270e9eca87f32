//! ISSUE TRACKER: `bd` (beads) client
//!
//! Everything the module knows about beads goes through the `IssueTracker`
//! trait. `BdClient` is the production implementation; it shells out to the
//! `bd` binary and treats its JSON output as opaque unless a typed view is
//! requested.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub mod client;
pub mod issue;
pub mod request;
pub mod tags;

pub use client::BdClient;
pub use issue::{parse_issue, parse_issue_list, Issue, IssueStatus, StatusFilter};
pub use request::{CreateIssue, UpdateIssue};
pub use tags::SessionTag;

/// Tracker errors
///
/// The variants keep the failure modes apart; consumers that only care about
/// "is there data" use [`TrackerError::is_unavailable`].
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("◆ `{0}` NOT INSTALLED OR NOT IN PATH")]
    NotInstalled(String),

    #[error("Command timed out after {0} seconds")]
    Timeout(u64),

    #[error("{message}")]
    CommandFailed { code: Option<i32>, message: String },

    #[error("Failed to execute bd: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("◆ MALFORMED BD OUTPUT: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

impl TrackerError {
    /// True for failures that mean "no usable answer" rather than a bug
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            TrackerError::NotInstalled(_)
                | TrackerError::Timeout(_)
                | TrackerError::CommandFailed { .. }
                | TrackerError::Spawn(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Access to the external issue tracker
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Whether the tracker binary can be found
    fn is_available(&self) -> bool;

    /// Run a raw tracker command and return its trimmed stdout
    async fn run(&self, args: Vec<String>, json: bool) -> Result<String>;

    async fn list_issues(&self, filter: StatusFilter) -> Result<Vec<Issue>> {
        let output = self.run(request::list(filter), true).await?;
        Ok(parse_issue_list(&output)?)
    }

    async fn ready_issues(&self) -> Result<Vec<Issue>> {
        let output = self.run(request::ready(), true).await?;
        Ok(parse_issue_list(&output)?)
    }

    async fn show_issue(&self, id: &str) -> Result<Issue> {
        let output = self.run(request::show(id), true).await?;
        Ok(parse_issue(&output)?)
    }

    /// Issues matching `filter`, or nothing when the tracker is absent,
    /// uninitialized or misbehaving
    async fn list_active_issues(&self, filter: StatusFilter) -> Vec<Issue> {
        if !self.is_available() {
            return Vec::new();
        }
        match self.list_issues(filter).await {
            Ok(issues) => issues,
            Err(e) => {
                debug!("◆ TRACKER QUERY FAILED: {}", e);
                Vec::new()
            }
        }
    }
}
