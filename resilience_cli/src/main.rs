mod cli;
mod display;
mod error;

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, RunCommand};
use error::ResilienceCliError;
use log::debug;
use resilience::config::Config;

const DEFAULT_LOGGING_LEVEL: &str = "warn";

fn main() -> Result<()> {
    // Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set
    let _ =
        std::env::var("RUST_LOG").map_err(|_| std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL));
    pretty_env_logger::init_timed();
    let args = Cli::parse();
    debug!("args: {args:?}");
    let config: Config = read_config_from_toml()?;
    debug!("config: {config:?}");

    if let Some(command) = args.command {
        match command.run(config) {
            Err(ResilienceCliError::IOError(err)) if err.kind() == ErrorKind::BrokenPipe => {
                debug!("stdout closed: {err}");
            }
            result => result?,
        }
    }
    Ok(())
}

fn config_path() -> Option<PathBuf> {
    // macOS: ~/Library/Application Support/resilience/config.toml
    dirs::config_dir().map(|dir| dir.join("resilience").join("config.toml"))
}

fn read_config_from_toml() -> Result<Config> {
    let Some(file_path) = config_path() else {
        return Ok(Config::default());
    };
    match std::fs::read_to_string(&file_path) {
        Ok(contents) => toml::from_str(&contents)
            .with_context(|| format!("Invalid TOML in config file {}", file_path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => {
            Err(e).with_context(|| format!("Error reading config file {}", file_path.display()))
        }
    }
}
