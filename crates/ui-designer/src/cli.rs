use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ui-designer-mcp")]
#[command(about = "UI Designer Power: Gemini-backed UI design tools over MCP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project root used for gem configuration and file discovery (defaults to CWD)
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server over stdio (default)
    Serve,

    /// List the available tools as JSON
    Tools,

    /// Call one tool directly and print its text output
    Call {
        /// Tool name (e.g. generate_component)
        name: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Show the effective settings (API key masked)
    Config,
}
