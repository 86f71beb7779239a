//! Config command handler
//!
//! View and modify configuration settings. API keys are never echoed.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "simulator.backend")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// List the settable keys
    #[arg(long, conflicts_with_all = ["key", "value"])]
    pub keys: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.keys {
        for key in Config::available_keys() {
            println!("{}", key);
        }
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (args.key, args.value) {
        (None, _) => print!("{}", render(&config)?),
        (Some(key), None) => {
            let value = config.get(&key).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown config key: {} (known keys: {})",
                    key,
                    Config::available_keys().join(", ")
                ))
            })?;
            println!("{}", display_value(&key, &value));
        }
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, display_value(&key, &value));
        }
    }

    Ok(())
}

fn is_secret(key: &str) -> bool {
    key.starts_with("api_keys.")
}

fn display_value(key: &str, value: &str) -> String {
    if is_secret(key) && !value.is_empty() {
        "***".to_string()
    } else {
        value.to_string()
    }
}

/// Render the whole config as TOML with secrets masked
fn render(config: &Config) -> Result<String> {
    let mut shown = config.clone();
    for key in [&mut shown.api_keys.random_org, &mut shown.api_keys.anu] {
        if !key.is_empty() {
            *key = "***".to_string();
        }
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
}
