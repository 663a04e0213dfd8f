//! Clipweave CLI: create, inspect, convert and preview `.project` files.
//!
//! Usage:
//!   clipweave init <NAME>          Create an empty project
//!   clipweave info <PATH>          Show project information
//!   clipweave validate <PATH>      Report problems a reload would repair
//!   clipweave pack <JSON>          Compress a plain JSON document
//!   clipweave unpack <PATH>        Decompress a project to JSON
//!   clipweave preview <PATH>       Sample a frame, optionally play or export

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clipweave_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "clipweave",
    about = "Timeline and composition tooling for Clipweave projects",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty project
    Init {
        /// Project name
        name: String,

        /// Output directory (defaults to the configured projects directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canvas width
        #[arg(long)]
        width: Option<u32>,

        /// Canvas height
        #[arg(long)]
        height: Option<u32>,

        /// Timeline frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Project length in milliseconds
        #[arg(long)]
        max_time: Option<f64>,
    },

    /// Show project information
    Info {
        /// Path to the .project file
        path: PathBuf,
    },

    /// Report problems that loading would silently repair or skip
    Validate {
        /// Path to the .project file
        path: PathBuf,
    },

    /// Compress a plain JSON document into a .project file
    Pack {
        /// Path to the JSON document
        input: PathBuf,

        /// Output file (defaults to the input with a .project extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decompress a .project file into pretty JSON
    Unpack {
        /// Path to the .project file
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a project headlessly and sample it
    Preview {
        /// Path to the .project file
        path: PathBuf,

        /// Playhead to sample, in milliseconds
        #[arg(long, default_value = "0")]
        at: f64,

        /// Write an export manifest to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export capture rate (defaults to the configured export fps)
        #[arg(long)]
        fps: Option<u32>,

        /// Play from the sampled playhead to the end in real time first
        #[arg(long)]
        play: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    clipweave_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            name,
            output,
            width,
            height,
            fps,
            max_time,
        } => commands::init::run(&config, name, output, width, height, fps, max_time),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Pack { input, output } => commands::pack::run(input, output),
        Commands::Unpack { path, output } => commands::unpack::run(path, output),
        Commands::Preview {
            path,
            at,
            export,
            fps,
            play,
        } => {
            let fps = fps.unwrap_or(config.playback.export_fps);
            let tick = play.then(|| config.playback.tick_interval());
            commands::preview::run(path, at, export, fps, tick).await
        }
    }
}
