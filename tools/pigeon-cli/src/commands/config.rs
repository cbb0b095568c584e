//! Configuration management command.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig, CONFIG_FILE_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force, as_json } => init_config(force, as_json, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("File", &path.display().to_string()),
        None => ctx.output.kv("File", "(defaults)"),
    }
    ctx.output.kv("Base URL", &ctx.config.base_url);
    ctx.output.kv("Timeout", &format!("{}s", ctx.config.timeout_secs));
    ctx.output.kv("Delivery", &ctx.config.delivery.to_string());
    ctx.output.kv("State dir", &ctx.state_dir().display().to_string());

    let retry = &ctx.config.retry;
    ctx.output.info("Retry policy:");
    ctx.output.list_item(&format!("max retries: {}", retry.max_retries));
    ctx.output.list_item(&format!(
        "backoff: {}ms base, {}ms max",
        retry.base_delay_ms, retry.max_delay_ms
    ));
    let codes: Vec<String> = retry
        .retryable_status_codes
        .iter()
        .map(|c| c.to_string())
        .collect();
    ctx.output.list_item(&format!("retry on: {}", codes.join(", ")));

    Ok(())
}

fn init_config(force: bool, as_json: bool, ctx: &Context) -> Result<()> {
    let name = if as_json {
        CONFIG_FILE_NAMES[2]
    } else {
        CONFIG_FILE_NAMES[0]
    };
    let config_path = ctx.cwd.join(name);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if as_json {
        CliConfig::default().save(&config_path)?;
    } else {
        fs::write(&config_path, generate_default_config())?;
    }
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
