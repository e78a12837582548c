//! The status transition command.

use super::notify::{Notifier, STATUS_UPDATED, STATUS_UPDATE_FAILED};
use crate::cache::{Invalidate, QueryCache};
use crate::client::{BackendError, OrderBackend};
use crate::core::{OrderResponse, TransitionTable, UpdateOrderStatus};
use crate::enforcement::{check_request, join_violations, StatusChangeRequest, ViolationError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stillwater::validation::Validation;

/// Errors that can occur while changing an order's status.
///
/// All of them are recoverable: the displayed status is left alone and the
/// operator may retry.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Status change refused: {}", join_violations(.violations))]
    NotOffered { violations: Vec<ViolationError> },

    #[error("A status change for this order is already in flight")]
    InFlight,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Liveness of the view that started a status change.
///
/// Once unmounted, results arriving later are not rendered.
#[derive(Clone, Debug)]
pub struct ViewHandle {
    mounted: Arc<AtomicBool>,
}

impl Default for ViewHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewHandle {
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }
}

/// Sends status changes to the backend and keeps the order cache in step.
///
/// The local table only filters what is offered; the backend decides. A
/// status is never applied locally before the backend confirms it.
pub struct StatusTransitionCommand<B: ?Sized> {
    backend: Arc<B>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    table: Arc<TransitionTable>,
}

impl<B: OrderBackend + ?Sized> StatusTransitionCommand<B> {
    pub fn new(
        backend: Arc<B>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
        table: Arc<TransitionTable>,
    ) -> Self {
        Self {
            backend,
            cache,
            notifier,
            table,
        }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Request the change described by `request`.
    ///
    /// On success both order lists and the order's detail are invalidated
    /// and refetched; the detail is fetched even if it was not cached. On
    /// failure nothing local changes. Notifications are
    /// only emitted while `view` is mounted.
    pub async fn execute(
        &self,
        request: &StatusChangeRequest,
        view: &ViewHandle,
    ) -> Result<OrderResponse, TransitionError> {
        if let Validation::Failure(errors) = check_request(&self.table, request) {
            let violations: Vec<ViolationError> = errors.iter().cloned().collect();
            tracing::warn!(
                order_id = %request.order_id,
                from = %request.from,
                to = %request.to,
                reason = %join_violations(&violations),
                "status change not offered, request not sent"
            );
            self.notify(view, |n| n.error(STATUS_UPDATE_FAILED));
            return Err(TransitionError::NotOffered { violations });
        }

        let body = UpdateOrderStatus { status: request.to };
        match self.backend.update_order_status(request.order_id, &body).await {
            Ok(order) => {
                tracing::info!(
                    order_id = %request.order_id,
                    from = %request.from,
                    to = %order.status,
                    "order status updated"
                );
                self.cache.invalidate(Invalidate::OrderLists);
                self.cache.invalidate(Invalidate::Order(request.order_id));
                let refreshed = self.cache.refetch_stale(self.backend.as_ref()).await;
                tracing::debug!(refreshed, "order queries refetched");

                // Controls opened from a list row have no detail entry, and a
                // filtered list may no longer contain the order at all.
                if self.cache.get_order(request.order_id).is_none() {
                    if let Err(error) = self
                        .cache
                        .fetch_order(self.backend.as_ref(), request.order_id)
                        .await
                    {
                        tracing::warn!(
                            order_id = %request.order_id,
                            %error,
                            "could not fetch updated order"
                        );
                    }
                }

                self.notify(view, |n| n.success(STATUS_UPDATED));
                Ok(order)
            }
            Err(error) => {
                tracing::warn!(
                    order_id = %request.order_id,
                    from = %request.from,
                    to = %request.to,
                    conflict = error.is_conflict(),
                    %error,
                    "order status update failed"
                );
                self.notify(view, |n| n.error(STATUS_UPDATE_FAILED));
                Err(error.into())
            }
        }
    }

    fn notify(&self, view: &ViewHandle, emit: impl FnOnce(&dyn Notifier)) {
        if view.is_mounted() {
            emit(self.notifier.as_ref());
        } else {
            tracing::debug!("view unmounted, notification dropped");
        }
    }
}
