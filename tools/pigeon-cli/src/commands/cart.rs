//! View and change the cart.

use std::collections::HashSet;

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;
use pigeon_cache::CacheStatus;
use pigeon_cart::{
    AddItem, CartClient, CartError, CartMutation, OptimisticCart, RemoveSelection,
};
use pigeon_commerce::prelude::*;

use super::{AddArgs, ClearArgs, RemoveArgs, SelectArgs, StepArgs, UpdateArgs};
use crate::context::Context;
use crate::output::savings_badge;

/// Load the cart behind a spinner.
pub(crate) async fn load(ctx: &Context) -> Result<OptimisticCart<CartClient>> {
    let cart = ctx.cart()?;
    let spinner = ctx.output.spinner("Loading cart...");
    let result = cart.load().await;
    spinner.finish_and_clear();
    result.context("Failed to load cart")?;
    Ok(cart)
}

/// Fetch a product and register its quantity limits with the cart.
///
/// A failed lookup is reported and the default limits stay in force.
async fn lookup_product(
    cart: &OptimisticCart<CartClient>,
    product_id: &ProductId,
    ctx: &Context,
) -> Option<Product> {
    let fetched = match ctx.products() {
        Ok(client) => client.get_product(product_id).await.map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };
    match fetched {
        Ok(product) => {
            cart.register_products([&product]);
            Some(product)
        }
        Err(e) => {
            ctx.output.warn(&format!(
                "Could not load product {} ({:#}); using default limits",
                product_id, e
            ));
            None
        }
    }
}

/// Product of a cached cart line.
fn line_product(cart: &OptimisticCart<CartClient>, item_id: &ItemId) -> Option<ProductId> {
    cart.cart()
        .and_then(|c| c.line(item_id).map(|l| l.product_id.clone()))
}

/// Run the show command.
pub async fn show(ctx: &Context) -> Result<()> {
    let cart = load(ctx).await?;
    print_cart(&cart, ctx)
}

/// Run the add command.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let product_id = ProductId::new(args.product_id);
    let cart = load(ctx).await?;
    let product = lookup_product(&cart, &product_id, ctx).await;

    let mut item = AddItem::new(product_id, args.quantity);
    if let Some(price) = args.price.map(Money::pln).or(product.as_ref().map(|p| p.price)) {
        item = item.with_unit_price(price);
    }
    if let Some(title) = args.title.or_else(|| product.as_ref().map(|p| p.title.clone())) {
        item = item.with_title(title);
    }
    if let Some(product) = product {
        item = item.with_seller(product.seller_id);
    }

    mutate(&cart, CartMutation::AddItem(item), "Adding item...", ctx).await?;
    ctx.output.success("Item added");
    print_cart(&cart, ctx)
}

/// Run the update command.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let cart = load(ctx).await?;
    let item_id = ItemId::new(args.item_id);
    if let Some(product_id) = line_product(&cart, &item_id) {
        lookup_product(&cart, &product_id, ctx).await;
    }
    let mutation = CartMutation::UpdateQuantity {
        item_id,
        quantity: args.quantity,
    };
    mutate(&cart, mutation, "Updating quantity...", ctx).await?;
    ctx.output.success("Quantity updated");
    print_cart(&cart, ctx)
}

/// Run the increment or decrement command.
pub async fn step(args: StepArgs, up: bool, ctx: &Context) -> Result<()> {
    let cart = load(ctx).await?;
    let item_id = ItemId::new(args.item_id);
    let line = cart
        .cart()
        .and_then(|c| c.line(&item_id).map(|l| (l.product_id.clone(), l.quantity)));
    let Some((product_id, current)) = line else {
        bail!("No line {} in the cart", item_id);
    };

    lookup_product(&cart, &product_id, ctx).await;
    let bounds = cart.bounds(&product_id);
    let next = if up {
        bounds.increment(current)
    } else {
        bounds.decrement(current)
    };
    if next == current {
        ctx.output
            .info(&format!("Quantity already at {} ({}..={})", current, bounds.min, bounds.max));
        return Ok(());
    }

    let mutation = CartMutation::UpdateQuantity {
        item_id,
        quantity: next,
    };
    mutate(&cart, mutation, "Updating quantity...", ctx).await?;
    ctx.output.success(&format!("Quantity {} → {}", current, next));
    print_cart(&cart, ctx)
}

/// Run the remove command.
pub async fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let mut ids: Vec<ItemId> = args.item_ids.into_iter().map(ItemId::new).collect();
    let mutation = if ids.len() == 1 {
        CartMutation::RemoveItem(ids.remove(0))
    } else {
        CartMutation::RemoveItems(RemoveSelection::Ids(ids))
    };

    let cart = load(ctx).await?;
    mutate(&cart, mutation, "Removing...", ctx).await?;
    ctx.output.success("Removed");
    print_cart(&cart, ctx)
}

/// Run the clear command.
pub async fn clear(args: ClearArgs, ctx: &Context) -> Result<()> {
    let cart = load(ctx).await?;
    if cart.cart().is_some_and(|c| c.is_empty()) {
        ctx.output.info("Your cart is already empty");
        return Ok(());
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Remove every item from the cart?")
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    mutate(
        &cart,
        CartMutation::RemoveItems(RemoveSelection::All),
        "Clearing cart...",
        ctx,
    )
    .await?;
    ctx.output.success("Cart cleared");
    print_cart(&cart, ctx)
}

/// Run the select command.
pub async fn select(args: SelectArgs, ctx: &Context) -> Result<()> {
    let cart = load(ctx).await?;
    let selection: HashSet<ItemId> = if args.item_ids.is_empty() {
        cart.cart()
            .map(|c| c.lines.iter().map(|l| l.item_id.clone()).collect())
            .unwrap_or_default()
    } else {
        args.item_ids.into_iter().map(ItemId::new).collect()
    };

    let summary = cart.summary(&selection)?;
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "selectedCount": summary.selected_count,
            "selectedTotal": summary.selected_total,
        }));
        return Ok(());
    }

    ctx.output.header("Selection");
    ctx.output.kv("Items", &summary.selected_count.to_string());
    ctx.output.kv("Total", &summary.selected_total.display());
    if summary.selected_count < selection.len() {
        ctx.output.warn(&format!(
            "{} selected id(s) are not in the cart",
            selection.len() - summary.selected_count
        ));
    }
    Ok(())
}

/// Apply a mutation and wait for the cart to be refreshed.
async fn mutate(
    cart: &OptimisticCart<CartClient>,
    mutation: CartMutation,
    msg: &str,
    ctx: &Context,
) -> Result<()> {
    let spinner = ctx.output.spinner(msg);
    let name = mutation.name();
    let result = cart.mutate(mutation).await;
    if result.is_ok() {
        spinner.set_message("Refreshing cart...");
        cart.settle().await;
    }
    spinner.finish_and_clear();

    if let Err(e) = result {
        if let Some(problem) = problem_json(&e) {
            ctx.output.debug(&format!("Problem: {}", problem));
        }
        return Err(e).with_context(|| format!("Cart {} failed; changes rolled back", name));
    }

    if cart.status() == Some(CacheStatus::Failed) {
        ctx.output
            .warn("Could not refresh the cart; showing the expected result");
    }
    Ok(())
}

fn problem_json(e: &CartError) -> Option<String> {
    match e {
        CartError::Fetch(fetch) => fetch
            .problem()
            .and_then(|p| serde_json::to_string(p).ok()),
        _ => None,
    }
}

/// Print the cached cart grouped by seller.
pub(crate) fn print_cart(cart: &OptimisticCart<CartClient>, ctx: &Context) -> Result<()> {
    let Some(cart) = cart.cart() else {
        bail!("Cart has not been loaded");
    };

    if ctx.output.is_json() {
        ctx.output.json(&cart);
        return Ok(());
    }

    ctx.output.header(&format!("Cart {}", cart.cart_id));
    if cart.is_empty() {
        ctx.output.info("Your cart is empty");
        return Ok(());
    }

    for group in group_by_seller(&cart.lines) {
        let seller = group
            .seller_id
            .map(|s| format!("Seller {}", s))
            .unwrap_or_else(|| "Other items".to_string());
        println!("\n  {}  ({})", seller, group.subtotal()?.display());

        for line in &group.lines {
            let name = line.title.as_deref().unwrap_or(line.product_id.as_str());
            let savings = line.savings()?;
            ctx.output.list_item(&format!(
                "{} × {}  {}  {}  [{}]",
                line.quantity,
                name,
                line.line_total()?.display(),
                savings_badge(&savings.display(), savings.is_positive()),
                line.item_id
            ));
        }
    }

    let currency = cart.currency();
    let (totals, estimated) = match cart.computed {
        Some(computed) => (computed, false),
        None => (
            cart_totals(&cart.lines, Money::new(ctx.config.delivery, currency))?,
            true,
        ),
    };
    println!();
    ctx.output.kv("Items", &cart.item_count().to_string());
    ctx.output.kv("Subtotal", &totals.subtotal.display());
    ctx.output.kv("Delivery", &totals.delivery.display());
    let total = if estimated {
        format!("{} (estimate)", totals.total.display())
    } else {
        totals.total.display()
    };
    ctx.output.kv("Total", &total);

    let saved = total_savings(&cart.lines, currency)?;
    if saved.is_positive() {
        ctx.output.kv("You save", &saved.display());
    }
    Ok(())
}
