//! Validation-based checks for status changes and transition tables.
//!
//! Checks use Stillwater's `Validation` type so that every problem is
//! reported at once instead of stopping at the first one.
//!
//! # Example
//!
//! ```rust
//! use order_lifecycle::core::{OrderStatus, TransitionTable};
//! use order_lifecycle::enforcement::{check_request, StatusChangeRequest};
//! use uuid::Uuid;
//!
//! let table = TransitionTable::builtin();
//! let request = StatusChangeRequest::new(Uuid::new_v4(), OrderStatus::Shipped, OrderStatus::Delivered);
//!
//! assert!(check_request(&table, &request).is_success());
//! ```

pub mod context;
pub mod rules;
pub mod violations;

pub use context::StatusChangeRequest;
pub use rules::{check_request, check_table};
pub(crate) use violations::join_violations;
pub use violations::ViolationError;
