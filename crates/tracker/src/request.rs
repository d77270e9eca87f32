//! `bd` argument builders

use crate::issue::{IssueStatus, StatusFilter};

/// Arguments for `bd create`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateIssue {
    pub title: String,
    pub notes: Option<String>,
    /// Comma-separated ids blocking the new issue
    pub blocked_by: Option<String>,
    /// Comma-separated ids the new issue blocks
    pub blocks: Option<String>,
    /// Parent for a `discovered-from` link
    pub discovered_from: Option<String>,
}

impl CreateIssue {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["create".to_string(), self.title.clone()];
        push_flag(&mut args, "--discovered-from", self.discovered_from.as_deref());
        push_flag(&mut args, "--notes", self.notes.as_deref());
        push_flag(&mut args, "--blocked-by", self.blocked_by.as_deref());
        push_flag(&mut args, "--blocks", self.blocks.as_deref());
        args
    }
}

/// Arguments for `bd update`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateIssue {
    pub id: String,
    pub title: Option<String>,
    pub status: Option<IssueStatus>,
    pub notes: Option<String>,
    pub blocked_by: Option<String>,
    pub blocks: Option<String>,
}

impl UpdateIssue {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["update".to_string(), self.id.clone()];
        push_flag(&mut args, "--title", self.title.as_deref());
        push_flag(&mut args, "--status", self.status.as_ref().map(IssueStatus::as_str));
        push_flag(&mut args, "--notes", self.notes.as_deref());
        push_flag(&mut args, "--blocked-by", self.blocked_by.as_deref());
        push_flag(&mut args, "--blocks", self.blocks.as_deref());
        args
    }
}

pub fn ready() -> Vec<String> {
    vec!["ready".to_string()]
}

pub fn show(id: &str) -> Vec<String> {
    vec!["show".to_string(), id.to_string()]
}

pub fn close(id: &str, notes: Option<&str>) -> Vec<String> {
    let mut args = vec!["close".to_string(), id.to_string()];
    push_flag(&mut args, "--notes", notes);
    args
}

pub fn list(filter: StatusFilter) -> Vec<String> {
    let mut args = vec!["list".to_string()];
    push_flag(&mut args, "--status", filter.status().as_ref().map(IssueStatus::as_str));
    args
}

/// Empty values are treated as absent
fn push_flag(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}
