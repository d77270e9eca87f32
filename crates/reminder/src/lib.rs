//! Workflow reminders for beads-tracked sessions
//!
//! A session-scoped scheduler watches completed tool calls and decides, right
//! before each LLM request, whether to nudge the agent to keep its beads
//! issues in sync. Cheap in-memory gates run first so the tracker is only
//! queried when a reminder is actually due.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use tracing::debug;

use beads_config::{ConfigError, ReminderConfig};
use beads_tracker::{Issue, IssueTracker, StatusFilter};

mod message;

pub use message::{render_reminder, WorkflowReminder};

/// Per-session reminder state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderState {
    recent_tools: VecDeque<String>,
    calls_since_last_reminder: u32,
    ever_used_tracked_tool: bool,
}

impl ReminderState {
    /// Most recent tool names, oldest first
    pub fn recent_tools(&self) -> Vec<&str> {
        self.recent_tools.iter().map(String::as_str).collect()
    }

    pub fn calls_since_last_reminder(&self) -> u32 {
        self.calls_since_last_reminder
    }

    pub fn ever_used_tracked_tool(&self) -> bool {
        self.ever_used_tracked_tool
    }

    fn recently_used(&self, tool_name: &str) -> bool {
        self.recent_tools.iter().any(|t| t == tool_name)
    }

    fn record(&mut self, tool_name: &str, window: usize) {
        while self.recent_tools.len() >= window {
            self.recent_tools.pop_front();
        }
        self.recent_tools.push_back(tool_name.to_string());
        self.calls_since_last_reminder = self.calls_since_last_reminder.saturating_add(1);
    }
}

/// Why no reminder was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    /// Not enough tool calls since the last reminder
    Throttled,
    /// The tracked tool is in the recent window
    RecentlyUsed,
    /// Tracker unavailable, timed out or returned garbage
    QueryFailed,
    NoActiveWork,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Disabled => "disabled",
            SkipReason::Throttled => "throttled",
            SkipReason::RecentlyUsed => "tracked tool used recently",
            SkipReason::QueryFailed => "tracker query failed",
            SkipReason::NoActiveWork => "no active work",
        };
        f.write_str(text)
    }
}

/// Outcome of a pre-request check
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderDecision {
    Skip(SkipReason),
    Remind(WorkflowReminder),
}

impl ReminderDecision {
    pub fn is_remind(&self) -> bool {
        matches!(self, ReminderDecision::Remind(_))
    }

    pub fn reminder(&self) -> Option<&WorkflowReminder> {
        match self {
            ReminderDecision::Remind(reminder) => Some(reminder),
            ReminderDecision::Skip(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            ReminderDecision::Skip(reason) => Some(*reason),
            ReminderDecision::Remind(_) => None,
        }
    }
}

/// Rate-limited workflow reminder for one session
#[derive(Debug)]
pub struct WorkflowReminderScheduler {
    session_id: String,
    config: ReminderConfig,
    state: ReminderState,
}

impl WorkflowReminderScheduler {
    /// Create a scheduler with empty state; rejects invalid thresholds
    pub fn new(
        session_id: impl Into<String>,
        config: ReminderConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            session_id: session_id.into(),
            config,
            state: ReminderState::default(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn state(&self) -> &ReminderState {
        &self.state
    }

    /// Record a completed tool call
    pub fn on_tool_completed(&mut self, tool_name: &str) {
        if !self.config.enabled {
            return;
        }

        self.state.record(tool_name, self.config.recent_tool_threshold);
        if tool_name == self.config.tracked_tool {
            self.state.ever_used_tracked_tool = true;
        }
    }

    /// Decide whether the next LLM request should carry a reminder.
    ///
    /// `active_work` is only awaited once every in-memory gate has passed. Its
    /// errors are logged and read as "nothing to remind about".
    pub async fn on_before_request<F, Fut, E>(&mut self, active_work: F) -> ReminderDecision
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Issue>, E>>,
        E: fmt::Display,
    {
        if let Some(reason) = self.precheck() {
            return self.skip(reason);
        }

        let issues = match active_work().await {
            Ok(issues) => issues,
            Err(e) => {
                debug!(
                    "Workflow reminder: active work query failed for session {}: {}",
                    self.session_id, e
                );
                return self.skip(SkipReason::QueryFailed);
            }
        };

        if issues.is_empty() {
            return self.skip(SkipReason::NoActiveWork);
        }

        self.state.calls_since_last_reminder = 0;
        let reminder = WorkflowReminder::new(issues, self.config.max_displayed_items);
        debug!(
            "Workflow reminder: firing for session {} ({} active)",
            self.session_id,
            reminder.total()
        );
        ReminderDecision::Remind(reminder)
    }

    /// Same as [`Self::on_before_request`], querying in-progress issues
    pub async fn check_tracker<T>(&mut self, tracker: &T) -> ReminderDecision
    where
        T: IssueTracker + ?Sized,
    {
        self.on_before_request(|| tracker.list_issues(StatusFilter::InProgress))
            .await
    }

    fn precheck(&self) -> Option<SkipReason> {
        if !self.config.enabled {
            return Some(SkipReason::Disabled);
        }
        if self.state.calls_since_last_reminder < self.config.reminder_interval {
            return Some(SkipReason::Throttled);
        }
        if self.state.recently_used(&self.config.tracked_tool) {
            return Some(SkipReason::RecentlyUsed);
        }
        None
    }

    fn skip(&self, reason: SkipReason) -> ReminderDecision {
        debug!(
            "Workflow reminder: skipped for session {} ({})",
            self.session_id, reason
        );
        ReminderDecision::Skip(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(window: usize, interval: u32) -> WorkflowReminderScheduler {
        WorkflowReminderScheduler::new(
            "test-session",
            ReminderConfig {
                recent_tool_threshold: window,
                reminder_interval: interval,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_state_starts_empty() {
        let s = scheduler(5, 8);
        assert!(s.state().recent_tools().is_empty());
        assert_eq!(s.state().calls_since_last_reminder(), 0);
        assert!(!s.state().ever_used_tracked_tool());
        assert_eq!(s.session_id(), "test-session");
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut s = scheduler(3, 8);
        for name in ["a", "b", "c", "d"] {
            s.on_tool_completed(name);
        }
        assert_eq!(s.state().recent_tools(), vec!["b", "c", "d"]);
        assert_eq!(s.state().calls_since_last_reminder(), 4);
    }

    #[test]
    fn test_tracked_tool_flag_is_sticky() {
        let mut s = scheduler(2, 8);
        s.on_tool_completed("beads");
        for _ in 0..5 {
            s.on_tool_completed("read_file");
        }
        assert!(!s.state().recently_used("beads"));
        assert!(s.state().ever_used_tracked_tool());
    }

    #[test]
    fn test_precheck_order() {
        let mut s = scheduler(5, 2);
        assert_eq!(s.precheck(), Some(SkipReason::Throttled));

        s.on_tool_completed("beads");
        s.on_tool_completed("edit_file");
        assert_eq!(s.precheck(), Some(SkipReason::RecentlyUsed));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = WorkflowReminderScheduler::new(
            "s",
            ReminderConfig {
                reminder_interval: 0,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::Throttled.to_string(), "throttled");
        assert_eq!(SkipReason::RecentlyUsed.to_string(), "tracked tool used recently");
    }
}
