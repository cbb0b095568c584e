//! Optimistic cart state.
//!
//! Mutations follow a fixed sequence for the cart's cache key:
//!
//! 1. cancel any background refetch, so it cannot overwrite step 3
//! 2. snapshot the cached state
//! 3. write the speculative result of the mutation
//! 4. send the real request
//! 5. on success, refetch in the background; server state replaces the
//!    speculative one, temporary line ids included
//! 6. on failure, restore the snapshot and return the error; refetch if
//!    the restored state may still hold unconfirmed lines
//!
//! Overlapping mutations are not serialized beyond single cache writes;
//! the last write wins until the refetch reconciles with the server.

use crate::client::CartApi;
use crate::error::CartError;
use crate::mutation::CartMutation;
use crate::types::{AddItem, CartState, QuoteRequest, RemoveSelection};
use pigeon_cache::{cache_key, CacheStatus, QueryCache};
use pigeon_commerce::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Cache namespace for carts.
pub const CART_NAMESPACE: &str = "cart";

/// Cached cart with optimistic mutations.
pub struct OptimisticCart<A> {
    api: Arc<A>,
    cache: QueryCache<CartState>,
    key: String,
    bounds: Arc<RwLock<HashMap<ProductId, QuantityBounds>>>,
}

impl<A> Clone for OptimisticCart<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: self.cache.clone(),
            key: self.key.clone(),
            bounds: Arc::clone(&self.bounds),
        }
    }
}

impl<A: CartApi + 'static> OptimisticCart<A> {
    /// Create an empty cart view over `api`.
    pub fn new(api: Arc<A>) -> Self {
        Self::with_cache(api, QueryCache::new())
    }

    /// Share an existing cache.
    pub fn with_cache(api: Arc<A>, cache: QueryCache<CartState>) -> Self {
        Self {
            api,
            cache,
            key: cache_key!(CART_NAMESPACE, "current"),
            bounds: Arc::default(),
        }
    }

    /// Remember the quantity limits of `products` for later mutations.
    pub fn register_products<'a>(&self, products: impl IntoIterator<Item = &'a Product>) {
        let mut bounds = self.bounds.write().unwrap_or_else(|p| p.into_inner());
        for product in products {
            bounds.insert(product.id.clone(), product.quantity_bounds());
        }
    }

    /// Quantity limits for a product, `[1, 99]` until its metadata is known.
    pub fn bounds(&self, product_id: &ProductId) -> QuantityBounds {
        self.bounds
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(product_id)
            .copied()
            .unwrap_or_default()
    }

    /// Cache key for the cart.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying cache.
    pub fn cache(&self) -> &QueryCache<CartState> {
        &self.cache
    }

    /// Cached cart, speculative or confirmed.
    pub fn cart(&self) -> Option<Cart> {
        self.cache.get(&self.key).map(|s| s.cart)
    }

    /// Concurrency token of the cached cart.
    pub fn etag(&self) -> Option<String> {
        self.cache.get(&self.key).and_then(|s| s.etag)
    }

    /// Cache status of the cart.
    pub fn status(&self) -> Option<CacheStatus> {
        self.cache.status(&self.key)
    }

    /// Fetch the cart and cache it.
    pub async fn load(&self) -> Result<Cart, CartError> {
        self.cache.cancel_refetch(&self.key);
        let state = self.api.get_cart().await?;
        let cart = state.cart.clone();
        self.cache.set(&self.key, state);
        Ok(cart)
    }

    /// Start a background refetch of the cart.
    pub fn invalidate(&self) {
        let api = Arc::clone(&self.api);
        self.cache
            .refetch(&self.key, async move { api.get_cart().await });
    }

    /// Wait for the in-flight refetch, if any.
    pub async fn settle(&self) {
        self.cache.settle(&self.key).await;
    }

    /// Apply a mutation optimistically and send it.
    pub async fn mutate(&self, mutation: CartMutation) -> Result<(), CartError> {
        let bounds = mutation
            .product_id(self.cart().as_ref())
            .map(|id| self.bounds(id))
            .unwrap_or_default();
        mutation.validate(&bounds)?;

        let cancelled = self.cache.cancel_refetch(&self.key);
        let snapshot = self.cache.snapshot(&self.key);
        let etag = snapshot.value().and_then(|s| s.etag.clone());

        self.speculate(&mutation)?;

        match self.dispatch(&mutation, etag.as_deref()).await {
            Ok(()) => {
                tracing::debug!(mutation = mutation.name(), "Mutation confirmed, refetching cart");
                self.invalidate();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    mutation = mutation.name(),
                    error = %e,
                    "Mutation failed, rolling back cart"
                );
                let unconfirmed = snapshot
                    .value()
                    .is_some_and(|s| s.cart.has_temporary_lines());
                self.cache.restore(&self.key, snapshot);
                // The snapshot may predate a change the server already accepted.
                if cancelled || unconfirmed {
                    self.invalidate();
                }
                Err(e)
            }
        }
    }

    /// Write the expected outcome of `mutation` into the cache.
    fn speculate(&self, mutation: &CartMutation) -> Result<(), CartError> {
        let applied = self.cache.update(&self.key, |state| {
            let mut cart = state.cart.clone();
            mutation.apply(&mut cart)?;
            state.cart = cart;
            Ok::<_, CommerceError>(())
        });

        match applied {
            Some(result) => Ok(result?),
            None if matches!(mutation, CartMutation::AddItem(_)) => {
                // Nothing cached yet; the add starts an unconfirmed cart.
                let mut cart = Cart::new(CartId::new(""));
                mutation.apply(&mut cart)?;
                self.cache.set(&self.key, CartState { cart, etag: None });
                self.cache.invalidate(&self.key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn dispatch(&self, mutation: &CartMutation, etag: Option<&str>) -> Result<(), CartError> {
        match mutation {
            CartMutation::AddItem(item) => {
                self.api.add_item(item).await?;
            }
            CartMutation::UpdateQuantity { item_id, quantity } => {
                let updated = self.api.update_quantity(item_id, *quantity, etag).await?;
                if let Some(cart) = updated {
                    // Interim server view until the refetch brings a new ETag.
                    self.cache.update(&self.key, |state| state.cart = cart);
                }
            }
            CartMutation::RemoveItem(item_id) => self.api.remove_item(item_id).await?,
            CartMutation::RemoveItems(selection) => self.api.remove_items(selection).await?,
        }
        Ok(())
    }

    /// Add a product optimistically.
    pub async fn add_item(&self, item: AddItem) -> Result<(), CartError> {
        self.mutate(CartMutation::AddItem(item)).await
    }

    /// Set a line's quantity optimistically.
    pub async fn update_quantity(&self, item_id: ItemId, quantity: u32) -> Result<(), CartError> {
        self.mutate(CartMutation::UpdateQuantity { item_id, quantity })
            .await
    }

    /// Remove a line optimistically.
    pub async fn remove_item(&self, item_id: ItemId) -> Result<(), CartError> {
        self.mutate(CartMutation::RemoveItem(item_id)).await
    }

    /// Remove several lines, or all of them, optimistically.
    pub async fn remove_items(&self, selection: RemoveSelection) -> Result<(), CartError> {
        self.mutate(CartMutation::RemoveItems(selection)).await
    }

    /// Ask the server to price the cached cart. On success the cached cart
    /// takes the quoted totals.
    pub async fn quote(&self) -> Result<Cart, CartError> {
        let cart = self.cart().ok_or(CartError::NotLoaded)?;
        let quoted = self.api.get_quote(&QuoteRequest::from_cart(&cart)).await?;
        let computed = quoted.computed;
        self.cache
            .update(&self.key, |state| state.cart.computed = computed);
        Ok(quoted)
    }

    /// Count and total of the selected lines in the cached cart.
    pub fn summary(&self, selection: &HashSet<ItemId>) -> Result<SelectionSummary, CartError> {
        let cart = self.cart().ok_or(CartError::NotLoaded)?;
        Ok(aggregate(&cart.lines, selection)?)
    }
}
