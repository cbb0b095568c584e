//! Cart REST client.

use crate::error::CartError;
use crate::types::{
    AddItem, CartState, QuoteRequest, RemoveItemsBody, RemoveSelection, UpdateQuantityBody,
};
use async_trait::async_trait;
use pigeon_commerce::prelude::*;
use pigeon_data::FetchClient;

/// Cart resource.
pub const CART_PATH: &str = "/cart";
/// Cart lines collection.
pub const CART_ITEMS_PATH: &str = "/cart/items";
/// Pricing preview.
pub const CART_QUOTE_PATH: &str = "/cart/quote";

/// Remote cart operations.
///
/// Implementations decide transport and retries; callers only see the final
/// outcome of each call.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch the cart and its concurrency token.
    async fn get_cart(&self) -> Result<CartState, CartError>;

    /// Add a product. Returns the `Location` of the new line, if given.
    async fn add_item(&self, item: &AddItem) -> Result<Option<String>, CartError>;

    /// Set a line's absolute quantity. Returns the updated cart when the
    /// server sends one back.
    async fn update_quantity(
        &self,
        item_id: &ItemId,
        quantity: u32,
        etag: Option<&str>,
    ) -> Result<Option<Cart>, CartError>;

    /// Remove one line.
    async fn remove_item(&self, item_id: &ItemId) -> Result<(), CartError>;

    /// Remove several lines, or all of them.
    async fn remove_items(&self, selection: &RemoveSelection) -> Result<(), CartError>;

    /// Price the given contents.
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Cart, CartError>;
}

/// [`CartApi`] over HTTP.
///
/// Every call goes through [`FetchClient`], so idempotent calls are retried
/// and each call carries its own correlation id.
#[derive(Clone)]
pub struct CartClient {
    http: FetchClient,
}

impl CartClient {
    /// Create a client. `http` should carry the API base URL.
    pub fn new(http: FetchClient) -> Self {
        Self { http }
    }

    fn item_path(item_id: &ItemId) -> String {
        format!("{}/{}", CART_ITEMS_PATH, item_id)
    }
}

#[async_trait]
impl CartApi for CartClient {
    async fn get_cart(&self) -> Result<CartState, CartError> {
        let response = self.http.get(CART_PATH).send().await?;
        let etag = response.etag().map(str::to_string);
        let cart: Cart = response.json()?;
        Ok(CartState { cart, etag })
    }

    async fn add_item(&self, item: &AddItem) -> Result<Option<String>, CartError> {
        QuantityBounds::default().validate(item.quantity)?;

        let response = self.http.post(CART_ITEMS_PATH).json(item)?.send().await?;
        if response.status != 201 {
            tracing::debug!(status = response.status, "Add item did not answer 201 Created");
        }
        Ok(response.location().map(str::to_string))
    }

    async fn update_quantity(
        &self,
        item_id: &ItemId,
        quantity: u32,
        etag: Option<&str>,
    ) -> Result<Option<Cart>, CartError> {
        QuantityBounds::default().validate(quantity)?;

        let response = self
            .http
            .put(Self::item_path(item_id))
            .if_match(etag)
            .json(&UpdateQuantityBody { quantity })?
            .send()
            .await?;

        if response.body.is_empty() {
            return Ok(None);
        }
        let cart = response
            .json::<Cart>()
            .map_err(|e| CartError::UnexpectedResponse(e.to_string()))?;
        Ok(Some(cart))
    }

    async fn remove_item(&self, item_id: &ItemId) -> Result<(), CartError> {
        self.http.delete(Self::item_path(item_id)).send().await?;
        Ok(())
    }

    async fn remove_items(&self, selection: &RemoveSelection) -> Result<(), CartError> {
        let request = match selection {
            RemoveSelection::All => self.http.delete(CART_ITEMS_PATH).query("all", "true"),
            RemoveSelection::Ids(ids) if ids.is_empty() => return Ok(()),
            RemoveSelection::Ids(ids) => self
                .http
                .delete(CART_ITEMS_PATH)
                .json(&RemoveItemsBody { item_ids: ids })?,
        };
        request.send().await?;
        Ok(())
    }

    async fn get_quote(&self, request: &QuoteRequest) -> Result<Cart, CartError> {
        let response = self.http.post(CART_QUOTE_PATH).json(request)?.send().await?;
        let cart: Cart = response.json()?;
        if cart.computed.is_none() {
            return Err(CartError::UnexpectedResponse(
                "quote without computed totals".to_string(),
            ));
        }
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigeon_data::{Method, MockTransport, Response, CORRELATION_ID_HEADER};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn cart_json() -> serde_json::Value {
        serde_json::json!({
            "cartId": "c-1",
            "items": [{
                "itemId": "i-1",
                "productId": "p-1",
                "quantity": 2,
                "price": {"amount": 1000, "currency": "PLN"}
            }]
        })
    }

    fn client() -> (Arc<MockTransport>, CartClient) {
        let transport = Arc::new(MockTransport::new());
        let http = FetchClient::with_transport(transport.clone()).with_base_url("https://shop.example/api");
        (transport, CartClient::new(http))
    }

    #[tokio::test]
    async fn test_get_cart_returns_etag() {
        let (transport, client) = client();
        let headers = HashMap::from([("ETag".to_string(), "\"v3\"".to_string())]);
        transport.push_response(Response::new(200, headers, cart_json().to_string().into_bytes()));

        let state = client.get_cart().await.unwrap();
        assert_eq!(state.etag.as_deref(), Some("\"v3\""));
        assert_eq!(state.cart.lines.len(), 1);

        let sent = &transport.requests()[0];
        assert_eq!(sent.method(), Method::Get);
        assert_eq!(sent.url(), "https://shop.example/api/cart");
        assert!(sent.header_value(CORRELATION_ID_HEADER).is_some());
    }

    #[tokio::test]
    async fn test_add_item_posts_once_and_reads_location() {
        let (transport, client) = client();
        let headers = HashMap::from([("Location".to_string(), "/cart/items/i-9".to_string())]);
        transport.push_response(Response::new(201, headers, Vec::new()));

        let location = client
            .add_item(&AddItem::new(ProductId::new("p-9"), 1))
            .await
            .unwrap();
        assert_eq!(location.as_deref(), Some("/cart/items/i-9"));

        let sent = &transport.requests()[0];
        assert_eq!(sent.method(), Method::Post);
        assert_eq!(sent.body_bytes(), Some(&br#"{"productId":"p-9","quantity":1}"#[..]));
    }

    #[tokio::test]
    async fn test_add_item_is_not_retried() {
        let (transport, client) = client();
        transport.push_status(503).push_status(201);

        let err = client
            .add_item(&AddItem::new(ProductId::new("p-9"), 1))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_update_sends_if_match() {
        let (transport, client) = client();
        transport.push_json(200, &cart_json());

        let updated = client
            .update_quantity(&ItemId::new("i-1"), 5, Some("\"v3\""))
            .await
            .unwrap();
        assert!(updated.is_some());

        let sent = &transport.requests()[0];
        assert_eq!(sent.method(), Method::Put);
        assert_eq!(sent.url(), "https://shop.example/api/cart/items/i-1");
        assert_eq!(sent.header_value("If-Match"), Some("\"v3\""));
        assert_eq!(sent.body_bytes(), Some(&br#"{"quantity":5}"#[..]));
    }

    #[tokio::test]
    async fn test_update_rejects_out_of_range_without_request() {
        let (transport, client) = client();
        let err = client
            .update_quantity(&ItemId::new("i-1"), 100, None)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_is_retried() {
        let (transport, client) = client();
        transport.push_status(502).push_status(204);

        let updated = client
            .update_quantity(&ItemId::new("i-1"), 3, None)
            .await
            .unwrap();
        assert_eq!(updated, None);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_remove_items_shapes() {
        let (transport, client) = client();
        client.remove_items(&RemoveSelection::All).await.unwrap();
        client
            .remove_items(&RemoveSelection::Ids(vec![ItemId::new("a")]))
            .await
            .unwrap();
        client
            .remove_items(&RemoveSelection::Ids(Vec::new()))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].query_pairs(), &[("all".to_string(), "true".to_string())]);
        assert_eq!(requests[0].body_bytes(), None);
        assert_eq!(requests[1].body_bytes(), Some(&br#"{"itemIds":["a"]}"#[..]));
    }

    #[tokio::test]
    async fn test_client_error_surfaces_problem() {
        let (transport, client) = client();
        transport.push_json(
            400,
            &serde_json::json!({
                "type": "https://api.example.com/problems/validation-error",
                "title": "Validation Error",
                "status": 400,
                "detail": "Quantity exceeds stock"
            }),
        );

        let err = client.remove_item(&ItemId::new("i-1")).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 400: Quantity exceeds stock");
        assert!(err.is_validation());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_is_not_retried() {
        let (transport, client) = client();
        transport.push_status(500);

        let request = QuoteRequest {
            cart_id: CartId::new("c-1"),
            items: Vec::new(),
        };
        assert!(client.get_quote(&request).await.is_err());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_quote_requires_computed_totals() {
        let (transport, client) = client();
        transport.push_json(200, &cart_json());
        let request = QuoteRequest {
            cart_id: CartId::new("c-1"),
            items: Vec::new(),
        };
        let err = client.get_quote(&request).await.unwrap_err();
        assert!(matches!(err, CartError::UnexpectedResponse(_)));
    }
}
