//! Pure order lifecycle types.
//!
//! This module contains the pure core of the order status machine:
//! - `OrderStatus`, the lifecycle stages and their wire names
//! - The transition table and its lookups
//! - Order representations exchanged with the backend
//!
//! Nothing in this module performs I/O.

mod order;
mod status;
mod transitions;

pub use order::{OrderQuery, OrderResponse, PaginatedOrders, PaginationMeta, UpdateOrderStatus};
pub use status::{OrderStatus, ParseStatusError};
pub use transitions::{order_transitions, valid_transitions, InvalidTable, TransitionTable};
