//! Browse the product catalogue.

use anyhow::{Context as _, Result};
use pigeon_commerce::prelude::*;

use super::ProductsArgs;
use crate::context::Context;
use crate::output::savings_badge;

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.products()?;
    let spinner = ctx.output.spinner("Loading products...");
    let result = if args.recommended {
        client.get_recommended_products().await
    } else {
        let ids: Vec<ProductId> = args.product_ids.into_iter().map(ProductId::new).collect();
        client.get_products(&ids).await
    };
    spinner.finish_and_clear();
    let products = result.context("Failed to load products")?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(if args.recommended {
        "Recommended"
    } else {
        "Products"
    });
    if products.is_empty() {
        ctx.output.info("No products");
        return Ok(());
    }

    for product in &products {
        let bounds = product.quantity_bounds();
        let stock = if product.availability.in_stock {
            format!("qty {}..={}", bounds.min, bounds.max)
        } else {
            "out of stock".to_string()
        };
        let was = match product.list_price.and_then(|l| l.try_subtract(&product.price)) {
            Some(saving) if product.is_discounted() => {
                format!("  {}", savings_badge(&saving.display(), true))
            }
            _ => String::new(),
        };
        ctx.output.list_item(&format!(
            "{}  {}{}  ({})  [{}]",
            product.title,
            product.price.display(),
            was,
            stock,
            product.id
        ));
    }
    Ok(())
}
