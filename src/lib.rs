//! Order lifecycle: the order status state machine of an inventory
//! administration backend, seen from the client side.
//!
//! The core is pure: order statuses, the table of legal transitions and the
//! order representations. Effects are isolated in the shell, which sends
//! status changes to the backend (the authority on legality) and keeps a
//! query cache consistent by invalidating and refetching.
//!
//! # Core Concepts
//!
//! - **OrderStatus**: the nine lifecycle stages and their wire names
//! - **TransitionTable**: which statuses are offered from each status
//! - **Enforcement**: accumulating checks of requests and tables
//! - **Command / Control**: the status change flow and its view model
//!
//! # Example
//!
//! ```rust
//! use order_lifecycle::core::{valid_transitions, OrderStatus};
//!
//! let options = valid_transitions(OrderStatus::Picking);
//! assert_eq!(
//!     options,
//!     &[OrderStatus::Packed, OrderStatus::OnHold, OrderStatus::Cancelled]
//! );
//! assert!(valid_transitions(OrderStatus::Cancelled).is_empty());
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod core;
pub mod effects;
pub mod enforcement;

// Re-export commonly used types
pub use crate::core::{valid_transitions, OrderStatus, TransitionTable};
pub use effects::{StatusTransitionCommand, TransitionControl, TransitionError};
