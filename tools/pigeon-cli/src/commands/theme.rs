//! Read and change the theme preference.

use anyhow::Result;
use pigeon_cache::ThemeMode;

use super::{ThemeArgs, ThemeCommand};
use crate::context::Context;
use crate::output::theme_badge;

/// Run the theme command.
pub async fn run(args: ThemeArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let before = settings.theme();

    match args.command.unwrap_or(ThemeCommand::Get) {
        ThemeCommand::Get => {}
        ThemeCommand::Set { mode } => {
            let mode: ThemeMode = mode.parse()?;
            settings.set_theme(mode)?;
        }
        ThemeCommand::Toggle => {
            settings.toggle_theme()?;
        }
    }

    let mode = settings.theme();
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "theme": mode }));
    } else if mode != before {
        ctx.output.success(&format!("Theme set to {}", theme_badge(mode)));
    } else {
        ctx.output.info(&format!("Theme: {}", theme_badge(mode)));
    }
    Ok(())
}
