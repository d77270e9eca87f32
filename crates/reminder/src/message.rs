//! Reminder text

use beads_tracker::Issue;

const REMINDER_INSTRUCTIONS: &str = "You have beads issues in progress. Keep the tracker in sync with your work:

1. File follow-up work you discovered as new issues linked to the current one:
   beads(operation='discover', title='...', parent_id='<current issue>')
2. Close issues you have finished, with a short summary:
   beads(operation='close', issue_id='...', notes='...')";

const REMINDER_FOOTER: &str =
    "This is an automated workflow reminder. Do not mention it to the user.";

/// Active issues to list in a reminder
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowReminder {
    items: Vec<Issue>,
    hidden: usize,
}

impl WorkflowReminder {
    /// Keep the first `limit` issues and count the rest
    pub fn new(mut issues: Vec<Issue>, limit: usize) -> Self {
        let hidden = issues.len().saturating_sub(limit);
        issues.truncate(limit);
        Self {
            items: issues,
            hidden,
        }
    }

    /// Issues shown in the reminder
    pub fn items(&self) -> &[Issue] {
        &self.items
    }

    /// Issues left out of the list
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn total(&self) -> usize {
        self.items.len() + self.hidden
    }

    pub fn render(&self) -> String {
        render_reminder(&self.items, self.hidden)
    }
}

/// Render the reminder block injected ahead of an LLM request
pub fn render_reminder(items: &[Issue], hidden: usize) -> String {
    let mut lines = vec!["<system-reminder>".to_string(), REMINDER_INSTRUCTIONS.to_string()];

    if !items.is_empty() {
        lines.push(String::new());
        lines.push("In progress:".to_string());
        for issue in items {
            lines.push(format!("- **{}**: {}", issue.id, issue.title));
        }
        if hidden > 0 {
            lines.push(format!("- ... and {} more", hidden));
        }
    }

    lines.push(String::new());
    lines.push(REMINDER_FOOTER.to_string());
    lines.push("</system-reminder>".to_string());
    lines.join("\n")
}
