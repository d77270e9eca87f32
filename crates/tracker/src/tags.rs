//! Session tags embedded in issue notes.
//!
//! Issues are linked to agent sessions by markers of the form
//! `[amplifier:<kind>:<session_id>]` inside the free-text notes field. Existing
//! beads databases carry these markers, so the format is fixed.

use regex::Regex;
use std::sync::OnceLock;

/// Marker kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTag {
    /// Issue created in the session
    Created,
    ClaimedBy,
    ClosedIn,
    DiscoveredIn,
    /// Written when a claiming session ends; not a link
    SessionEnded,
}

impl SessionTag {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionTag::Created => "session",
            SessionTag::ClaimedBy => "claimed-by-session",
            SessionTag::ClosedIn => "closed-in-session",
            SessionTag::DiscoveredIn => "discovered-in-session",
            SessionTag::SessionEnded => "session-ended",
        }
    }

    pub fn render(&self, session_id: &str) -> String {
        format!("[amplifier:{}:{}]", self.kind(), session_id)
    }

    /// Append the marker to existing notes on its own line
    pub fn append_to(&self, notes: Option<&str>, session_id: &str) -> String {
        let tag = self.render(session_id);
        match notes.filter(|n| !n.is_empty()) {
            Some(existing) => format!("{}\n{}", existing, tag),
            None => tag,
        }
    }
}

static LINK_RE: OnceLock<Regex> = OnceLock::new();

fn link_re() -> &'static Regex {
    LINK_RE.get_or_init(|| {
        Regex::new(
            r"\[amplifier:(?:session|claimed-by-session|closed-in-session|discovered-in-session):([^\]]+)\]",
        )
        .unwrap()
    })
}

/// Session ids linked from `notes`, deduplicated in first-seen order
pub fn linked_sessions(notes: &str) -> Vec<String> {
    let mut sessions: Vec<String> = Vec::new();
    for caps in link_re().captures_iter(notes) {
        let id = &caps[1];
        if !sessions.iter().any(|s| s == id) {
            sessions.push(id.to_string());
        }
    }
    sessions
}

/// Whether `notes` record a claim by `session_id`
pub fn is_claimed_by(notes: &str, session_id: &str) -> bool {
    notes.contains(&SessionTag::ClaimedBy.render(session_id))
}
