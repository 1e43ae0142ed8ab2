use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;
mod context;
mod gem_tools;
mod mcp_server;
mod prompts;
mod tools;

#[cfg(test)]
mod test_support;

use cli::{Cli, Commands};
use context::ToolContext;
use uid_config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON-RPC stream.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .ok();

    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let root = project_root(cli.project_root)?;
            let ctx = ToolContext::from_settings(&settings, root)?;
            mcp_server::run_mcp_server(Arc::new(ctx)).await?;
        }
        Commands::Tools => {
            let tools = serde_json::to_string_pretty(&tools::tool_definitions())?;
            println!("{tools}");
        }
        Commands::Call { name, args } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            let root = project_root(cli.project_root)?;
            let ctx = ToolContext::from_settings(&settings, root)?;

            let result = tools::call_tool(&ctx, &name, arguments).await;
            for item in result["content"].as_array().into_iter().flatten() {
                if let Some(text) = item["text"].as_str() {
                    println!("{text}");
                }
            }
            if result["isError"].as_bool() == Some(true) {
                std::process::exit(1);
            }
        }
        Commands::Config => {
            let shown = toml::to_string_pretty(&settings.redacted_for_display())
                .context("Failed to render settings")?;
            match Settings::config_path() {
                Ok(path) => println!("# {}\n{shown}", path.display()),
                Err(_) => println!("{shown}"),
            }
        }
    }

    Ok(())
}

fn project_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}
