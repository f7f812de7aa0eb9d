// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supio - multi-tenant customer-support engine.
//!
//! This is the binary entry point for the Supio server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod serve;

/// Supio - multi-tenant customer-support engine.
#[derive(Parser, Debug)]
#[command(name = "supio", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Supio server.
    Serve,
    /// Write a commented sample config to ./supio.toml.
    Init,
}

const SAMPLE_CONFIG: &str = r#"# Supio configuration. Every key is optional.

[server]
host = "127.0.0.1"
port = 8080

[agent]
log_level = "info"
default_greet_message = "Hi! How can I help you today?"

[anthropic]
# api_key = "sk-ant-..."        # or set ANTHROPIC_API_KEY

[storage]
# database_path = "/var/lib/supio/supio.db"
# blob_dir = "/var/lib/supio/blobs"

[identity.tokens]
# "dashboard-token" = "org_id"
"#;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) | None => {
            let config = match &cli.config {
                Some(path) => supio_config::load_config_from_path(path),
                None => supio_config::load_config(),
            };
            let config = match config {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("supio: configuration error: {e}");
                    std::process::exit(1);
                }
            };

            if let Err(e) = serve::run_serve(config).await {
                eprintln!("supio: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Init) => {
            let path = std::path::Path::new("supio.toml");
            if path.exists() {
                eprintln!("supio: supio.toml already exists, refusing to overwrite");
                std::process::exit(1);
            }
            if let Err(e) = std::fs::write(path, SAMPLE_CONFIG) {
                eprintln!("supio: failed to write supio.toml: {e}");
                std::process::exit(1);
            }
            println!("supio: wrote supio.toml");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_serve() {
        let cli = Cli::parse_from(["supio", "serve"]);
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_parses_config_flag() {
        let cli = Cli::parse_from(["supio", "--config", "/etc/supio/supio.toml", "serve"]);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/etc/supio/supio.toml"))
        );
    }

    #[test]
    fn sample_config_is_valid_toml() {
        let config = supio_config::load_config_from_str(SAMPLE_CONFIG)
            .expect("sample config must parse");
        assert_eq!(config.server.port, 8080);
    }
}
