//! CLI module for clusterview
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `watch` - Follow the live workload list
//! - `ping` - Ping a kernel and break down where the time went
//! - `trace` - Segment saved request traces offline
//! - `workload` - Start, stop, pause or reconfigure workloads
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Follow workloads on a remote gateway
//! clusterview watch --gateway http://10.0.0.5:8000
//!
//! # Latency breakdown of a shell-socket ping
//! clusterview ping 3f1c0d2e --socket shell
//!
//! # Generate shell completions
//! clusterview completions bash > ~/.bash_completion.d/clusterview
//! ```

pub mod common;
pub mod completions;
pub mod config;
pub mod output;
pub mod ping;
pub mod trace;
pub mod watch;
pub mod workload;

pub use common::{build_context, load_config, shutdown_signal};
pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::api::SocketType;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// clusterview - distributed notebook cluster client
#[derive(Parser, Debug)]
#[command(
    name = "clusterview",
    version,
    about = "Watch workloads and trace request latency on a distributed Jupyter cluster"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the live workload list
    Watch(WatchArgs),
    /// Ping a kernel and show per-hop latency
    Ping(PingArgs),
    /// Segment request traces saved to a file
    Trace(TraceArgs),
    /// Control workloads
    #[command(subcommand)]
    Workload(WorkloadCommands),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by commands that talk to the gateway.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "clusterview.toml")]
    pub config: PathBuf,

    /// Override the gateway URL
    #[arg(short, long)]
    pub gateway: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output as JSON, one document per update
    #[arg(long)]
    pub json: bool,

    /// Print the current list once and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Kernel to ping
    pub kernel_id: String,

    /// Kernel socket to ping over (control, shell)
    #[arg(short, long, default_value = "control")]
    pub socket: SocketType,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// JSON file holding a ping response or an array of request traces
    pub file: PathBuf,

    /// Client time (unix ms) the reply was received
    #[arg(long)]
    pub reply_received_at: f64,

    /// Client time (unix ms) the request was sent
    #[arg(long)]
    pub request_sent_at: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum WorkloadCommands {
    /// Start a registered workload
    Start(WorkloadIdArgs),
    /// Stop a workload
    Stop(WorkloadIdArgs),
    /// Pause a running workload, or resume a paused one
    Pause(WorkloadIdArgs),
    /// Turn a workload's debug logging on or off
    DebugLogs(DebugLogsArgs),
    /// Stop every running workload
    StopAll(CommonArgs),
}

impl WorkloadCommands {
    pub fn common(&self) -> &CommonArgs {
        match self {
            WorkloadCommands::Start(args)
            | WorkloadCommands::Stop(args)
            | WorkloadCommands::Pause(args) => &args.common,
            WorkloadCommands::DebugLogs(args) => &args.common,
            WorkloadCommands::StopAll(common) => common,
        }
    }
}

#[derive(Args, Debug)]
pub struct WorkloadIdArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Workload ID
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct DebugLogsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Workload ID
    pub id: String,

    /// Desired debug logging state
    #[arg(value_enum)]
    pub state: Toggle,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "clusterview.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,

    /// Gateway URL to write into the [gateway] section
    #[arg(short, long)]
    pub gateway: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
