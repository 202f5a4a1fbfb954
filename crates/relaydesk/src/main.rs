// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relaydesk - multi-tenant customer support desk.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use relaydesk_config::{ConfigError, RelaydeskConfig};

/// Relaydesk - multi-tenant customer support desk.
#[derive(Parser, Debug)]
#[command(name = "relaydesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Validate the configuration and exit.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<RelaydeskConfig, Vec<ConfigError>> {
    match path {
        Some(path) => relaydesk_config::load_and_validate_path(path),
        None => relaydesk_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            relaydesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "relaydesk: config OK (agent.name={}, listen={}:{}, plans={})",
                config.agent.name,
                config.server.host,
                config.server.port,
                config.billing.plans.len()
            );
        }
        None => {
            println!("relaydesk: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["relaydesk", "--config", "desk.toml", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert_eq!(cli.config, Some(PathBuf::from("desk.toml")));

        let cli = Cli::try_parse_from(["relaydesk", "check-config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
    }

    #[test]
    fn explicit_config_path_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaydesk.toml");
        std::fs::write(&path, "[session]\nttl_secs = 0\n").unwrap();
        assert!(load(Some(&path)).is_err());

        std::fs::write(&path, "[agent]\nname = \"Echo\"\n").unwrap();
        assert_eq!(load(Some(&path)).unwrap().agent.name, "Echo");
    }
}
