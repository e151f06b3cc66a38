//! Operator CLI for per-bot proxy configuration
//!
//! Loads a configuration directory the same way the plugin does and shows
//! which proxy each bot would be given.

use anyhow::Context;
use botproxy_net::{GlobalConfig, ProxyRegistry, TransportProtocols};
use clap::{Parser, Subcommand};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "botproxy")]
#[command(about = "Inspect per-bot proxy configuration", long_about = None)]
struct Cli {
    /// Directory holding global.json and one <bot>.json per bot
    #[arg(short, long, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every bot with a proxy override, plus the fallback
    List,

    /// Show the proxy a bot's connections would use
    Resolve {
        /// Bot name (config file name without extension)
        bot: String,
    },

    /// Show whether proxy injection would be active
    Status,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let global = GlobalConfig::load(&cli.config_dir)
        .with_context(|| format!("loading global config from {}", cli.config_dir.display()))?;

    let output = match &cli.command {
        Commands::List => render_list(&load_registry(&cli.config_dir, &global)?),
        Commands::Resolve { bot } => render_resolve(&load_registry(&cli.config_dir, &global)?, bot),
        Commands::Status => render_status(&global),
    };
    print!("{}", output);

    Ok(())
}

fn load_registry(config_dir: &Path, global: &GlobalConfig) -> anyhow::Result<ProxyRegistry> {
    let registry = ProxyRegistry::load(config_dir, global.fallback_proxy())
        .with_context(|| format!("loading bot configs from {}", config_dir.display()))?;
    info!("{} bots with a proxy override", registry.len());
    Ok(registry)
}

fn render_list(registry: &ProxyRegistry) -> String {
    let mut out = String::new();
    for bot in registry.identities() {
        if let Some(proxy) = registry.lookup(bot) {
            let _ = writeln!(out, "{}\t{}", bot, proxy);
        }
    }
    match registry.fallback() {
        Some(proxy) => {
            let _ = writeln!(out, "*\t{}", proxy);
        }
        None => out.push_str("*\t(none)\n"),
    }
    out
}

fn render_resolve(registry: &ProxyRegistry, bot: &str) -> String {
    match (registry.lookup(bot), registry.resolve(bot)) {
        (Some(proxy), _) => format!("{}\t{}\n", bot, proxy),
        (None, Some(proxy)) => format!("{}\t{} (fallback)\n", bot, proxy),
        (None, None) => format!("{}\t(no proxy)\n", bot),
    }
}

fn render_status(global: &GlobalConfig) -> String {
    let protocols = global.transport_protocols;
    if protocols.is_web_socket_only() {
        format!("active (TransportProtocols = {})\n", protocols.0)
    } else {
        format!(
            "inactive (TransportProtocols = {}, needs {})\n",
            protocols.0,
            TransportProtocols::WEB_SOCKET.0
        )
    }
}
