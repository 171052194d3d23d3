use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "belongings",
    version,
    about = "Track items in containers across various locations"
)]
pub struct Cli {
    /// Directory holding the store database (`belongings.db`)
    #[arg(long, global = true, env = "BELONGINGS_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, env = "BELONGINGS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Write rolling log files here instead of stderr
    #[arg(long, global = true, env = "BELONGINGS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (REST routes, tools and SSE)
    Serve(ServeArgs),
    /// Add an item to a container, creating the container if needed
    Add { container: String, item: String },
    /// Remove the first matching item from a container
    Remove { container: String, item: String },
    /// Move an item between containers
    Move {
        from: String,
        to: String,
        item: String,
    },
    /// List the containers holding an item
    Search { item: String },
    /// Print every non-empty container
    List,
    /// Set a container's location and/or name
    Update {
        container: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Show one container, including empty ones
    Show { container: String },
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "BELONGINGS_HOST", default_value = belongings_server::DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "BELONGINGS_PORT", default_value_t = belongings_server::DEFAULT_PORT)]
    pub port: u16,

    /// Number of pooled SQLite connections
    #[arg(long, default_value_t = 4)]
    pub pool_size: usize,
}
