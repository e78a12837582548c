//! The status change an operator asked for.

use crate::core::OrderStatus;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A requested move of one order from its current status to `to`.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusChangeRequest {
    pub order_id: Uuid,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub requested_at: DateTime<Utc>,
}

impl StatusChangeRequest {
    pub fn new(order_id: Uuid, from: OrderStatus, to: OrderStatus) -> Self {
        Self {
            order_id,
            from,
            to,
            requested_at: Utc::now(),
        }
    }
}
