//! Product catalogue client.

use crate::error::CartError;
use pigeon_commerce::prelude::*;
use pigeon_data::FetchClient;

/// Product collection.
pub const PRODUCTS_PATH: &str = "/products";
/// Recommendations for the carousel.
pub const RECOMMENDED_PRODUCTS_PATH: &str = "/products/recommended";

/// Read-only client for the product catalogue.
///
/// Every call is a `GET`, so transient failures are retried by the
/// underlying [`FetchClient`].
#[derive(Clone)]
pub struct ProductClient {
    http: FetchClient,
}

impl ProductClient {
    /// Create a client. `http` should carry the API base URL.
    pub fn new(http: FetchClient) -> Self {
        Self { http }
    }

    /// Fetch one product.
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CartError> {
        let response = self
            .http
            .get(format!("{}/{}", PRODUCTS_PATH, id))
            .send()
            .await?;
        Ok(response.json()?)
    }

    /// Fetch several products in one request. An empty list sends nothing.
    pub async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CartError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = ids
            .iter()
            .fold(self.http.get(PRODUCTS_PATH), |request, id| {
                request.query("ids", id.as_str())
            });
        let products: Vec<Product> = request.send().await?.json()?;
        tracing::debug!(requested = ids.len(), returned = products.len(), "Fetched products");
        Ok(products)
    }

    /// Fetch recommended products.
    pub async fn get_recommended_products(&self) -> Result<Vec<Product>, CartError> {
        let response = self.http.get(RECOMMENDED_PRODUCTS_PATH).send().await?;
        Ok(response.json()?)
    }
}
