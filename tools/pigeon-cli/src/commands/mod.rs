//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod products;
pub mod quote;
pub mod theme;

use clap::{Args, Subcommand};

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product to add.
    pub product_id: String,

    /// Number of units.
    #[arg(short, long, default_value_t = 1)]
    pub quantity: u32,

    /// Unit price in minor units, shown until the server confirms the line.
    /// Defaults to the catalogue price.
    #[arg(long)]
    pub price: Option<i64>,

    /// Product title, shown until the server confirms the line.
    #[arg(long)]
    pub title: Option<String>,
}

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Cart line to change.
    pub item_id: String,

    /// New absolute quantity.
    pub quantity: u32,
}

/// Arguments for the increment and decrement commands.
#[derive(Args)]
pub struct StepArgs {
    /// Cart line to change.
    pub item_id: String,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Cart lines to remove.
    #[arg(required = true, num_args = 1..)]
    pub item_ids: Vec<String>,
}

/// Arguments for the clear command.
#[derive(Args)]
pub struct ClearArgs {
    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the select command.
#[derive(Args)]
pub struct SelectArgs {
    /// Cart lines to include in the summary.
    pub item_ids: Vec<String>,
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Products to look up.
    pub product_ids: Vec<String>,

    /// List recommended products instead.
    #[arg(long, conflicts_with = "product_ids")]
    pub recommended: bool,
}

/// Arguments for the theme command.
#[derive(Args)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: Option<ThemeCommand>,
}

#[derive(Subcommand)]
pub enum ThemeCommand {
    /// Show the current theme.
    Get,
    /// Set the theme.
    Set {
        /// `light` or `dark`.
        mode: String,
    },
    /// Switch between light and dark.
    Toggle,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,

        /// Write `pigeon.json` instead of a commented `pigeon.toml`.
        #[arg(long = "as-json")]
        as_json: bool,
    },
}
