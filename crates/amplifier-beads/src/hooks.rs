//! Session lifecycle hooks

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use beads_bus::{ContextRole, EventPayload, HookEvent, HookHandler, HookResult};
use beads_config::{Config, ConfigError, HooksConfig};
use beads_reminder::{ReminderDecision, ReminderState, WorkflowReminderScheduler};
use beads_tracker::tags::is_claimed_by;
use beads_tracker::{Issue, IssueTracker, SessionTag, StatusFilter, UpdateIssue};

const CLAIM_HINT: &str = "Use `beads(operation='claim', issue_id='...')` to claim a task.";

/// Render the session-start block for ready issues; empty when there are none
pub fn format_ready_work(issues: &[Issue], limit: usize) -> String {
    if issues.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "## Ready Work (beads)".to_string(),
        String::new(),
        "Tasks with no open blockers, ready to work on:".to_string(),
        String::new(),
    ];

    for issue in issues.iter().take(limit) {
        let priority = issue
            .priority_label()
            .map(|p| format!(" [{}]", p))
            .unwrap_or_default();
        lines.push(format!("- **{}**: {}{}", issue.id, issue.title, priority));
    }
    if issues.len() > limit {
        lines.push(format!("- ... and {} more", issues.len() - limit));
    }

    lines.push(String::new());
    lines.push(CLAIM_HINT.to_string());
    lines.push(String::new());
    lines.join("\n")
}

/// Beads hooks for one session
pub struct BeadsHooks {
    session_id: String,
    config: HooksConfig,
    tracker: Arc<dyn IssueTracker>,
    scheduler: Mutex<WorkflowReminderScheduler>,
}

impl BeadsHooks {
    pub fn new(
        session_id: impl Into<String>,
        config: &Config,
        tracker: Arc<dyn IssueTracker>,
    ) -> Result<Self, ConfigError> {
        let session_id = session_id.into();
        let scheduler = WorkflowReminderScheduler::new(session_id.clone(), config.reminder.clone())?;
        Ok(Self {
            session_id,
            config: config.hooks.clone(),
            tracker,
            scheduler: Mutex::new(scheduler),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Snapshot of the reminder state
    pub async fn reminder_state(&self) -> ReminderState {
        self.scheduler.lock().await.state().clone()
    }

    /// Ready-work block for session start, if there is any
    pub async fn ready_work(&self) -> Option<String> {
        if !self.tracker.is_available() {
            debug!("◆ BD NOT AVAILABLE, SKIPPING READY WORK");
            return None;
        }

        match self.tracker.ready_issues().await {
            Ok(issues) if issues.is_empty() => None,
            Ok(issues) => Some(format_ready_work(&issues, self.config.max_ready_items)),
            Err(e) => {
                debug!("◆ READY WORK UNAVAILABLE: {}", e);
                None
            }
        }
    }

    /// Mark every in-progress issue claimed by this session as ended.
    ///
    /// Returns the ids that were annotated.
    pub async fn annotate_session_end(&self) -> Vec<String> {
        let issues = self
            .tracker
            .list_active_issues(StatusFilter::InProgress)
            .await;

        let mut annotated = Vec::new();
        for issue in issues
            .into_iter()
            .filter(|issue| is_claimed_by(&issue.notes, &self.session_id))
        {
            let update = UpdateIssue {
                notes: Some(SessionTag::SessionEnded.render(&self.session_id)),
                ..UpdateIssue::new(issue.id.clone())
            };
            match self.tracker.run(update.to_args(), false).await {
                Ok(_) => annotated.push(issue.id),
                Err(e) => warn!("◆ SESSION END: FAILED TO ANNOTATE {}: {}", issue.id, e),
            }
        }

        info!(
            "◆ SESSION {} ENDED, {} CLAIMED ISSUE(S) ANNOTATED",
            self.session_id,
            annotated.len()
        );
        annotated
    }

    pub async fn record_tool(&self, tool_name: &str) {
        self.scheduler.lock().await.on_tool_completed(tool_name);
    }

    /// Run the reminder check against in-progress issues
    pub async fn decide(&self) -> ReminderDecision {
        let mut scheduler = self.scheduler.lock().await;
        scheduler.check_tracker(self.tracker.as_ref()).await
    }
}

#[async_trait]
impl HookHandler for BeadsHooks {
    fn name(&self) -> &str {
        "beads"
    }

    async fn handle(&self, event: &HookEvent) -> HookResult {
        if event.session_id != self.session_id {
            debug!(
                "◆ IGNORING EVENT FOR SESSION {} (MOUNTED FOR {})",
                event.session_id, self.session_id
            );
            return HookResult::none();
        }

        match &event.payload {
            EventPayload::SessionStart => {
                if !self.config.inject_ready {
                    return HookResult::none();
                }
                match self.ready_work().await {
                    Some(text) => HookResult::inject(text),
                    None => HookResult::none(),
                }
            }
            EventPayload::SessionEnd => {
                if self.config.annotate_session_end {
                    self.annotate_session_end().await;
                }
                HookResult::none()
            }
            EventPayload::ToolCallCompleted { tool_name } => {
                self.record_tool(tool_name).await;
                HookResult::none()
            }
            EventPayload::BeforeLlmRequest => match self.decide().await {
                ReminderDecision::Remind(reminder) => HookResult::inject(reminder.render())
                    .with_role(ContextRole::System)
                    .ephemeral(),
                ReminderDecision::Skip(_) => HookResult::none(),
            },
        }
    }
}
