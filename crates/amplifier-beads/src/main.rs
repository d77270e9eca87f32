//! Amplifier Beads - command-line harness

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    config_command, init_command, ready_command, remind_command, session_end_command,
    status_command, tool_command,
};

/// Amplifier Beads - issue tracking for agent sessions
#[derive(Parser)]
#[command(name = "amplifier-beads")]
#[command(about = "◆ Beads issue tracking for agent sessions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Config file (defaults to ~/.amplifier/beads.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,
    /// Print the effective config
    Config,
    /// Show bd availability and settings
    Status,
    /// Print the ready-work block injected at session start
    Ready {
        /// Session ID
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Run one beads tool call, e.g. '{"operation": "ready"}'
    Tool {
        /// Tool arguments as JSON
        args: String,
        /// Session ID used for tagging
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Annotate issues claimed by a session that has ended
    SessionEnd {
        /// Session ID
        #[arg(short, long)]
        session: String,
    },
    /// Replay tool calls through the workflow reminder
    Remind {
        /// Comma-separated tool names, oldest first
        #[arg(short, long, value_delimiter = ',')]
        tools: Vec<String>,
        /// Session ID
        #[arg(short, long)]
        session: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config;
    let result = match cli.command {
        Commands::Init => init_command(config).await,
        Commands::Config => config_command(config).await,
        Commands::Status => status_command(config).await,
        Commands::Ready { session } => ready_command(config, session).await,
        Commands::Tool { args, session } => tool_command(config, args, session).await,
        Commands::SessionEnd { session } => session_end_command(config, session).await,
        Commands::Remind { tools, session } => remind_command(config, tools, session).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
