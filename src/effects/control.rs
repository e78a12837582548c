//! View model of the "change status" control of one order.

use super::command::{StatusTransitionCommand, TransitionError, ViewHandle};
use crate::client::OrderBackend;
use crate::core::{OrderResponse, OrderStatus};
use crate::enforcement::StatusChangeRequest;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Offers the valid next statuses of one order and runs the chosen change.
///
/// The displayed status always comes from the order cache; selecting an
/// option never changes it directly.
pub struct TransitionControl<B: ?Sized> {
    order_id: Uuid,
    loaded_status: OrderStatus,
    command: Arc<StatusTransitionCommand<B>>,
    view: ViewHandle,
    pending: AtomicBool,
}

impl<B: OrderBackend + ?Sized> TransitionControl<B> {
    pub fn new(command: Arc<StatusTransitionCommand<B>>, order: &OrderResponse) -> Self {
        Self {
            order_id: order.id,
            loaded_status: order.status,
            command,
            view: ViewHandle::new(),
            pending: AtomicBool::new(false),
        }
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    /// Status as currently known from the cache, whether the order was
    /// loaded as a detail or as a list row.
    pub fn displayed_status(&self) -> OrderStatus {
        self.command
            .cache()
            .find_order(self.order_id)
            .map(|order| order.status)
            .unwrap_or(self.loaded_status)
    }

    /// Selectable next statuses, in presentation order.
    pub fn options(&self) -> &[OrderStatus] {
        self.command.table().valid_transitions(self.displayed_status())
    }

    /// Terminal orders get no control at all.
    pub fn is_visible(&self) -> bool {
        !self.options().is_empty()
    }

    /// The control is disabled while a change is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn view(&self) -> &ViewHandle {
        &self.view
    }

    pub fn unmount(&self) {
        self.view.unmount();
    }

    /// Ask the backend to move the order to `target`.
    pub async fn select(&self, target: OrderStatus) -> Result<OrderResponse, TransitionError> {
        if self.pending.swap(true, Ordering::AcqRel) {
            return Err(TransitionError::InFlight);
        }
        let _pending = PendingGuard(&self.pending);

        let request = StatusChangeRequest::new(self.order_id, self.displayed_status(), target);
        self.command.execute(&request, &self.view).await
    }
}

struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
