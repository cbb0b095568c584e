//! Pigeon CLI - command line client for the shopping cart API.
//!
//! Commands:
//! - `pigeon show` - Show the cart
//! - `pigeon add` - Add a product
//! - `pigeon update` / `inc` / `dec` - Change a line's quantity
//! - `pigeon remove` / `clear` - Remove lines
//! - `pigeon select` - Sum a selection of lines
//! - `pigeon quote` - Ask the server to price the cart
//! - `pigeon products` - Look up products or list recommendations
//! - `pigeon theme` - Read or change the theme preference
//! - `pigeon config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    AddArgs, ClearArgs, ConfigArgs, ProductsArgs, RemoveArgs, SelectArgs, StepArgs, ThemeArgs,
    UpdateArgs,
};

/// Pigeon - manage your shopping cart from the terminal
#[derive(Parser)]
#[command(name = "pigeon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,

    /// Add a product to the cart
    Add(AddArgs),

    /// Set a line's quantity
    Update(UpdateArgs),

    /// Increase a line's quantity by one
    Inc(StepArgs),

    /// Decrease a line's quantity by one
    Dec(StepArgs),

    /// Remove one or more lines
    Remove(RemoveArgs),

    /// Remove every line
    Clear(ClearArgs),

    /// Show count and total for selected lines
    Select(SelectArgs),

    /// Ask the server to price the cart
    Quote,

    /// Look up products or list recommendations
    Products(ProductsArgs),

    /// Read or change the theme
    Theme(ThemeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Install the log subscriber. `RUST_LOG` wins over `--verbose`.
fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = context::Context::load(cli.config.as_deref(), output)?;
    ctx.output.debug(&format!("Using API at {}", ctx.config.base_url));

    // Execute command
    let result = match cli.command {
        Commands::Show => commands::cart::show(&ctx).await,
        Commands::Add(args) => commands::cart::add(args, &ctx).await,
        Commands::Update(args) => commands::cart::update(args, &ctx).await,
        Commands::Inc(args) => commands::cart::step(args, true, &ctx).await,
        Commands::Dec(args) => commands::cart::step(args, false, &ctx).await,
        Commands::Remove(args) => commands::cart::remove(args, &ctx).await,
        Commands::Clear(args) => commands::cart::clear(args, &ctx).await,
        Commands::Select(args) => commands::cart::select(args, &ctx).await,
        Commands::Quote => commands::quote::run(&ctx).await,
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Theme(args) => commands::theme::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
