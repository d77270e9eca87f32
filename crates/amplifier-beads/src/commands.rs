//! Amplifier Beads command implementations

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use amplifier_beads::{bd_client, mount_bd, BeadsHooks};
use beads_bus::{HookBus, HookEvent};
use beads_config::{self, Config};
use beads_reminder::ReminderDecision;
use beads_tool::{BeadsTool, ToolRegistry};

fn resolve_path(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(beads_config::config_path)
}

async fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(&path)
            .await
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Config::load().await.context("failed to load default config"),
    }
}

fn session_or_new(session: Option<String>) -> String {
    session.unwrap_or_else(|| {
        let id = uuid::Uuid::new_v4().to_string();
        debug!("◆ GENERATED SESSION {}", id);
        id
    })
}

/// Hooks for one session, mounted on a fresh bus
fn mount_session(config: &Config, session_id: &str) -> Result<(HookBus, Arc<BeadsHooks>)> {
    let mut bus = HookBus::new();
    let mut registry = ToolRegistry::new();
    let hooks = mount_bd(&mut bus, &mut registry, config, session_id)?;
    Ok((bus, hooks))
}

/// Write a default config
pub async fn init_command(path: Option<PathBuf>) -> Result<()> {
    let path = resolve_path(path);
    let existed = path.exists();
    beads_config::init_at(&path)
        .await
        .with_context(|| format!("failed to initialize {}", path.display()))?;

    if existed {
        println!("✓ Config already present at {}", path.display());
    } else {
        println!("✓ Config written to {}", path.display());
    }
    Ok(())
}

/// Print the effective config
pub async fn config_command(path: Option<PathBuf>) -> Result<()> {
    let config = load_config(path).await?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Show bd availability and settings
pub async fn status_command(path: Option<PathBuf>) -> Result<()> {
    let path = resolve_path(path);
    let config = load_config(Some(path.clone())).await?;
    let client = bd_client(&config.tracker, config.tracker.tool_timeout());

    println!("◆ Amplifier Beads Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Config:    {} {}",
        path.display(),
        if path.exists() { "[OK]" } else { "[Defaults]" }
    );
    match client.locate() {
        Some(bin) => println!("bd:        {} [OK]", bin.display()),
        None => println!("bd:        {} [Not installed]", config.tracker.program),
    }

    let reminder = &config.reminder;
    println!(
        "Reminder:  {}",
        if reminder.enabled { "[Enabled]" } else { "[Disabled]" }
    );
    println!("  Window:   {} tool calls", reminder.recent_tool_threshold);
    println!("  Interval: {} tool calls", reminder.reminder_interval);
    println!("  Shown:    {} issues", reminder.max_displayed_items);
    println!("  Tracked:  {}", reminder.tracked_tool);

    Ok(())
}

/// Print the session-start injection
pub async fn ready_command(path: Option<PathBuf>, session: Option<String>) -> Result<()> {
    let config = load_config(path).await?;
    let session_id = session_or_new(session);
    let (bus, _hooks) = mount_session(&config, &session_id)?;

    let results = bus.emit(&HookEvent::session_start(&session_id)).await;
    match results.first().and_then(|r| r.context_injection.as_deref()) {
        Some(text) => println!("{}", text),
        None => println!("No ready work to inject"),
    }
    Ok(())
}

/// Run one beads tool call
pub async fn tool_command(
    path: Option<PathBuf>,
    args: String,
    session: Option<String>,
) -> Result<()> {
    let config = load_config(path).await?;
    let args: serde_json::Value =
        serde_json::from_str(&args).context("tool arguments must be a JSON object")?;

    let tracker = Arc::new(bd_client(&config.tracker, config.tracker.tool_timeout()));
    let mut tool = BeadsTool::new(tracker);
    if let Some(session_id) = session {
        tool = tool.with_session(session_id);
    }
    let mut registry = ToolRegistry::new();
    registry.register(tool);

    let result = registry.call("beads", args).await;
    println!("{}", result.output);
    if !result.success {
        bail!("beads tool call failed");
    }
    Ok(())
}

/// Annotate issues claimed by an ended session
pub async fn session_end_command(path: Option<PathBuf>, session: String) -> Result<()> {
    let config = load_config(path).await?;
    let (_bus, hooks) = mount_session(&config, &session)?;

    let annotated = hooks.annotate_session_end().await;
    if annotated.is_empty() {
        println!("No issues claimed by session {}", session);
    } else {
        println!("✓ Annotated {} issue(s): {}", annotated.len(), annotated.join(", "));
    }
    Ok(())
}

/// Replay tool calls and print the reminder decision
pub async fn remind_command(
    path: Option<PathBuf>,
    tools: Vec<String>,
    session: Option<String>,
) -> Result<()> {
    let config = load_config(path).await?;
    let session_id = session_or_new(session);
    let (bus, hooks) = mount_session(&config, &session_id)?;

    for tool in tools.iter().filter(|t| !t.is_empty()) {
        bus.emit(&HookEvent::tool_call_completed(&session_id, tool.as_str()))
            .await;
    }

    let state = hooks.reminder_state().await;
    println!(
        "Recent tools: [{}] ({} since last reminder)",
        state.recent_tools().join(", "),
        state.calls_since_last_reminder()
    );

    match hooks.decide().await {
        ReminderDecision::Remind(reminder) => println!("{}", reminder.render()),
        ReminderDecision::Skip(reason) => println!("No reminder: {}", reason),
    }
    Ok(())
}
