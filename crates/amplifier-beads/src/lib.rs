//! Amplifier Beads - issue tracking wired into agent sessions
//!
//! Mounting the module registers the `beads` tool and subscribes
//! [`BeadsHooks`] to every session lifecycle event.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use beads_bus::{EventKind, HookBus};
use beads_config::{Config, ConfigError, TrackerConfig};
use beads_tool::{BeadsTool, ToolRegistry};
use beads_tracker::{BdClient, IssueTracker};

pub mod hooks;

pub use hooks::{format_ready_work, BeadsHooks};

/// `bd` client built from the tracker section
pub fn bd_client(config: &TrackerConfig, timeout: Duration) -> BdClient {
    let client = BdClient::new(config.program.clone(), timeout);
    match config.working_dir.as_deref() {
        Some(dir) => client.with_working_dir(dir),
        None => client,
    }
}

/// Register the tool and subscribe the hooks, sharing one tracker
pub fn mount(
    bus: &mut HookBus,
    registry: &mut ToolRegistry,
    config: &Config,
    session_id: &str,
    tracker: Arc<dyn IssueTracker>,
) -> Result<Arc<BeadsHooks>, ConfigError> {
    mount_split(bus, registry, config, session_id, tracker.clone(), tracker)
}

/// Mount against `bd`, with the tool and hook timeouts from `config`
pub fn mount_bd(
    bus: &mut HookBus,
    registry: &mut ToolRegistry,
    config: &Config,
    session_id: &str,
) -> Result<Arc<BeadsHooks>, ConfigError> {
    let tool_tracker = Arc::new(bd_client(&config.tracker, config.tracker.tool_timeout()));
    let hook_tracker = Arc::new(bd_client(&config.tracker, config.tracker.hook_timeout()));
    mount_split(bus, registry, config, session_id, tool_tracker, hook_tracker)
}

fn mount_split(
    bus: &mut HookBus,
    registry: &mut ToolRegistry,
    config: &Config,
    session_id: &str,
    tool_tracker: Arc<dyn IssueTracker>,
    hook_tracker: Arc<dyn IssueTracker>,
) -> Result<Arc<BeadsHooks>, ConfigError> {
    config.validate()?;

    registry.register(BeadsTool::new(tool_tracker).with_session(session_id));

    let hooks = Arc::new(BeadsHooks::new(session_id, config, hook_tracker)?);
    for kind in EventKind::ALL {
        bus.subscribe(kind, hooks.clone());
    }

    info!("◆ BEADS MOUNTED FOR SESSION {}", session_id);
    Ok(hooks)
}
