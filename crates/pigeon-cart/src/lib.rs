//! Cart API client and optimistic cart state for Pigeon.
//!
//! [`CartClient`] speaks the cart REST API through `pigeon-data`, so reads,
//! quantity updates and removals are retried while adds and quotes are sent
//! once. [`OptimisticCart`] keeps the cart in a `pigeon-cache` query cache,
//! shows each mutation immediately, rolls back on failure and reconciles
//! with the server by refetching on success.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pigeon_cart::{AddItem, CartClient, OptimisticCart};
//! use pigeon_commerce::{Money, ProductId};
//! use pigeon_data::FetchClient;
//!
//! # async fn run() -> Result<(), pigeon_cart::CartError> {
//! let http = FetchClient::new().with_base_url("https://shop.example/api");
//! let cart = OptimisticCart::new(Arc::new(CartClient::new(http)));
//!
//! cart.load().await?;
//! cart.add_item(AddItem::new(ProductId::new("mouse"), 1).with_unit_price(Money::pln(4999)))
//!     .await?;
//! cart.settle().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod mutation;
mod optimistic;
mod products;
mod types;

pub use client::{CartApi, CartClient, CART_ITEMS_PATH, CART_PATH, CART_QUOTE_PATH};
pub use error::CartError;
pub use mutation::CartMutation;
pub use optimistic::{OptimisticCart, CART_NAMESPACE};
pub use products::{ProductClient, PRODUCTS_PATH, RECOMMENDED_PRODUCTS_PATH};
pub use types::{AddItem, CartState, QuoteItem, QuoteRequest, RemoveSelection};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AddItem, CartApi, CartClient, CartError, CartMutation, CartState, OptimisticCart,
        ProductClient, RemoveSelection,
    };
}
