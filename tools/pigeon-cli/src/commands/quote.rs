//! Ask the server to price the cart.

use anyhow::{Context as _, Result};

use super::cart::{load, print_cart};
use crate::context::Context;

/// Run the quote command.
pub async fn run(ctx: &Context) -> Result<()> {
    let cart = load(ctx).await?;

    let spinner = ctx.output.spinner("Requesting quote...");
    let result = cart.quote().await;
    spinner.finish_and_clear();
    let quoted = result.context("Failed to get a quote")?;

    if let Some(computed) = quoted.computed {
        ctx.output.debug(&format!(
            "Quoted {} for {} line(s)",
            computed.total.display(),
            quoted.lines.len()
        ));
    }
    print_cart(&cart, ctx)
}
