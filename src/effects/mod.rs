//! Effectful side of the order lifecycle.
//!
//! This module is the "imperative shell" around the pure core: it talks to
//! the backend, updates the order cache and notifies the operator.
//!
//! # Key Concepts
//!
//! - **Command**: sends one status change, then invalidates and refetches
//! - **Control**: what a single order's status dropdown offers and does
//! - **Notifications**: recoverable failures surface here, never as panics

mod command;
mod control;
mod notify;

pub use command::{StatusTransitionCommand, TransitionError, ViewHandle};
pub use control::TransitionControl;
pub use notify::{
    LogNotifier, Notification, NotificationQueue, Notifier, STATUS_UPDATED, STATUS_UPDATE_FAILED,
};
