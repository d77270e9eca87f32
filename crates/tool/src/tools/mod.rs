//! TOOLKIT: trait, registry and host-facing results

pub mod beads;

pub use beads::{BeadsTool, Operation};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::ToolError;

type BoxedTool = Box<dyn ToolTrait + Send + Sync>;

pub type ToolOutcome = Result<String, Box<dyn std::error::Error + Send + Sync>>;

#[async_trait]
pub trait ToolTrait: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Value;
    async fn execute(&self, args: Value) -> ToolOutcome;
}

/// Tool description advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn of(tool: &dyn ToolTrait) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.parameters(),
        }
    }
}

/// What the host sees after a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(err: &ToolError) -> Self {
        Self {
            success: false,
            output: err.to_json(),
        }
    }

    /// Errors that are not a `ToolError` are reported as `command_failed`
    pub fn from_outcome(outcome: ToolOutcome) -> Self {
        match outcome {
            Ok(output) => Self::ok(output),
            Err(e) => match e.downcast::<ToolError>() {
                Ok(tool_err) => Self::error(&tool_err),
                Err(other) => Self {
                    success: false,
                    output: serde_json::json!({
                        "error": "command_failed",
                        "message": other.to_string(),
                    })
                    .to_string(),
                },
            },
        }
    }
}

/// TOOLKIT registry
pub struct ToolRegistry {
    tools: HashMap<String, BoxedTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register<T: ToolTrait + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&(dyn ToolTrait + Send + Sync)> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Definitions sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition::of(t.as_ref()))
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub async fn execute(&self, name: &str, args: Value) -> ToolOutcome {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))?;
        tool.execute(args).await
    }

    /// Execute and fold the outcome into a [`ToolResult`]
    pub async fn call(&self, name: &str, args: Value) -> ToolResult {
        ToolResult::from_outcome(self.execute(name, args).await)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
