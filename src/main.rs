// This is the entry point of the welcome module admin tool.
//
// **Architecture Overview:**
// - `core/` = Business logic (embeds, validation, welcome workflow)
// - `infra/` = Implementations of core traits (HTTP client, configuration)
// - `cli/` = Command-line adapters (argument parsing, printing)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Run the requested command

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Data};
use crate::core::guild::ActiveGuild;
use crate::core::welcome::WelcomeService;
use crate::infra::config::AppConfig;
use crate::infra::welcome::WelcomeApiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening. Logs go to stderr so
    // command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // The active guild is shared by reference: the client reads it on every
    // request, so `--guild` below takes effect immediately.

    let guild = ActiveGuild::new(config.default_guild_id.clone());
    if let Some(id) = &cli.guild {
        guild.set(id.clone());
    }

    let client = WelcomeApiClient::new(config.api_base_url.clone(), guild.clone());
    let data = Data {
        guild,
        welcome: WelcomeService::new(client),
    };

    tracing::debug!(
        api = %config.api_base_url,
        guild_id = %data.guild.get(),
        "Running command"
    );

    cli::run(cli.command, &data).await
}
