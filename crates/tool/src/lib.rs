//! BEADS TOOLKIT: `bd` exposed as an agent tool

use serde_json::json;
use thiserror::Error;

use beads_tracker::TrackerError;

pub mod tools;

pub use tools::{
    BeadsTool, Operation, ToolDefinition, ToolOutcome, ToolRegistry, ToolResult, ToolTrait,
};

pub const INSTALL_INSTRUCTIONS: &str = "The 'bd' CLI (beads) is not installed or not in PATH.

Install via one of these methods:

  Homebrew (macOS/Linux):
    brew tap steveyegge/beads && brew install bd

  npm:
    npm install -g @beads/bd

  go install:
    go install github.com/steveyegge/beads/cmd/bd@latest

  Shell script:
    curl -fsSL https://raw.githubusercontent.com/steveyegge/beads/main/scripts/install.sh | bash

Documentation: https://github.com/steveyegge/beads/blob/main/docs/INSTALLING.md";

/// Tool errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("◆ TOOL '{0}' NOT FOUND")]
    ToolNotFound(String),

    #[error("{}", INSTALL_INSTRUCTIONS)]
    NotInstalled,

    #[error("Operation required")]
    MissingOperation,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("{field} required for {operation} operation")]
    MissingField {
        field: &'static str,
        operation: &'static str,
    },

    #[error("Failed to parse issue data")]
    ParseFailed,

    #[error("{0}")]
    Tracker(#[from] TrackerError),
}

impl ToolError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::ToolNotFound(_) => "tool_not_found",
            ToolError::NotInstalled => "beads_not_installed",
            ToolError::MissingOperation => "missing_operation",
            ToolError::UnknownOperation(_) => "unknown_operation",
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::MissingField { .. } => "missing_field",
            ToolError::ParseFailed => "parse_failed",
            ToolError::Tracker(_) => "command_failed",
        }
    }

    /// JSON payload handed back to the agent
    pub fn to_json(&self) -> String {
        json!({
            "error": self.code(),
            "message": self.to_string(),
        })
        .to_string()
    }
}
