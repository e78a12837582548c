//! Access to the backend order service.
//!
//! [`OrderBackend`] is the seam between the transition command and the
//! network; [`HttpOrderBackend`] implements it over HTTP.

mod error;
mod http;

pub use error::BackendError;
pub use http::HttpOrderBackend;

use crate::core::{OrderQuery, OrderResponse, PaginatedOrders, UpdateOrderStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Operations the order lifecycle needs from the backend order service.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// `PATCH /orders/{id}/status`. The backend decides whether the
    /// transition is legal.
    async fn update_order_status(
        &self,
        id: Uuid,
        body: &UpdateOrderStatus,
    ) -> Result<OrderResponse, BackendError>;

    /// `GET /orders/{id}`
    async fn get_order(&self, id: Uuid) -> Result<OrderResponse, BackendError>;

    /// `GET /orders`
    async fn list_orders(&self, query: &OrderQuery) -> Result<PaginatedOrders, BackendError>;

    /// The backend's own transition table, keyed by wire name.
    async fn fetch_transitions(&self) -> Result<HashMap<String, Vec<String>>, BackendError> {
        Err(BackendError::Unsupported)
    }
}
