//! Status change flow against an in-memory backend.

use async_trait::async_trait;
use chrono::Utc;
use order_lifecycle::cache::{QueryCache, QueryKey};
use order_lifecycle::client::{BackendError, OrderBackend};
use order_lifecycle::core::{
    OrderQuery, OrderResponse, OrderStatus, PaginatedOrders, PaginationMeta, TransitionTable,
    UpdateOrderStatus,
};
use order_lifecycle::effects::{
    Notification, NotificationQueue, StatusTransitionCommand, TransitionControl, TransitionError,
    STATUS_UPDATED, STATUS_UPDATE_FAILED,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

#[derive(Default)]
struct InMemoryBackend {
    orders: Mutex<HashMap<Uuid, OrderResponse>>,
    updates: Mutex<Vec<(Uuid, OrderStatus)>>,
    reject_with: Mutex<Option<u16>>,
    gets: Mutex<usize>,
    gate: Option<Arc<Notify>>,
}

impl InMemoryBackend {
    fn with_order(order: OrderResponse) -> Self {
        let backend = Self::default();
        backend.orders.lock().unwrap().insert(order.id, order);
        backend
    }

    fn reject_with(&self, status: u16) {
        *self.reject_with.lock().unwrap() = Some(status);
    }

    fn updates(&self) -> Vec<(Uuid, OrderStatus)> {
        self.updates.lock().unwrap().clone()
    }

    fn gets(&self) -> usize {
        *self.gets.lock().unwrap()
    }
}

#[async_trait]
impl OrderBackend for InMemoryBackend {
    async fn update_order_status(
        &self,
        id: Uuid,
        body: &UpdateOrderStatus,
    ) -> Result<OrderResponse, BackendError> {
        self.updates.lock().unwrap().push((id, body.status));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(status) = *self.reject_with.lock().unwrap() {
            return Err(BackendError::Rejected {
                status,
                message: "Invalid status transition".to_string(),
            });
        }
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(&id).ok_or(BackendError::NotFound)?;
        order.status = body.status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn get_order(&self, id: Uuid) -> Result<OrderResponse, BackendError> {
        *self.gets.lock().unwrap() += 1;
        self.orders
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn list_orders(&self, _query: &OrderQuery) -> Result<PaginatedOrders, BackendError> {
        let data: Vec<OrderResponse> = self.orders.lock().unwrap().values().cloned().collect();
        let total = data.len() as u64;
        Ok(PaginatedOrders {
            data,
            meta: PaginationMeta {
                page: 1,
                limit: 20,
                total,
                total_pages: 1,
            },
        })
    }
}

fn order(status: OrderStatus) -> OrderResponse {
    OrderResponse {
        id: Uuid::new_v4(),
        order_number: "ORD-042".to_string(),
        status,
        client_id: Some(Uuid::new_v4()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        extra: Default::default(),
    }
}

struct Harness {
    backend: Arc<InMemoryBackend>,
    cache: Arc<QueryCache>,
    notifications: Arc<NotificationQueue>,
    command: Arc<StatusTransitionCommand<InMemoryBackend>>,
}

impl Harness {
    fn new(backend: InMemoryBackend) -> Self {
        let backend = Arc::new(backend);
        let cache = Arc::new(QueryCache::new());
        let notifications = Arc::new(NotificationQueue::new());
        let command = Arc::new(StatusTransitionCommand::new(
            Arc::clone(&backend),
            Arc::clone(&cache),
            notifications.clone(),
            Arc::new(TransitionTable::builtin()),
        ));
        Self {
            backend,
            cache,
            notifications,
            command,
        }
    }

    /// Load the order the way a detail view and the list view would.
    async fn open(&self, id: Uuid) -> TransitionControl<InMemoryBackend> {
        let order = self.cache.fetch_order(self.backend.as_ref(), id).await.unwrap();
        self.cache
            .fetch_orders(self.backend.as_ref(), &OrderQuery::default())
            .await
            .unwrap();
        TransitionControl::new(Arc::clone(&self.command), &order)
    }
}

#[tokio::test]
async fn picking_order_offers_packed_on_hold_cancelled() {
    let picking = order(OrderStatus::Picking);
    let harness = Harness::new(InMemoryBackend::with_order(picking.clone()));
    let control = harness.open(picking.id).await;

    assert!(control.is_visible());
    assert_eq!(
        control.options(),
        &[OrderStatus::Packed, OrderStatus::OnHold, OrderStatus::Cancelled]
    );
}

#[tokio::test]
async fn confirmed_transition_invalidates_and_refetches() {
    let picking = order(OrderStatus::Picking);
    let harness = Harness::new(InMemoryBackend::with_order(picking.clone()));
    let control = harness.open(picking.id).await;
    let gets_before = harness.backend.gets();

    let updated = control.select(OrderStatus::Packed).await.unwrap();

    assert_eq!(updated.status, OrderStatus::Packed);
    assert_eq!(harness.backend.updates(), vec![(picking.id, OrderStatus::Packed)]);
    assert_eq!(harness.backend.gets(), gets_before + 1);
    assert_eq!(harness.cache.is_stale(&QueryKey::Order(picking.id)), Some(false));
    assert_eq!(
        harness.cache.get_orders(&OrderQuery::default()).unwrap().data[0].status,
        OrderStatus::Packed
    );
    assert_eq!(control.displayed_status(), OrderStatus::Packed);
    assert_eq!(
        control.options(),
        &[OrderStatus::Shipped, OrderStatus::OnHold, OrderStatus::Cancelled]
    );
    assert_eq!(
        harness.notifications.drain(),
        vec![Notification::Success(STATUS_UPDATED.to_string())]
    );
    assert!(!control.is_pending());
}

#[tokio::test]
async fn rejected_transition_leaves_status_unchanged() {
    let picking = order(OrderStatus::Picking);
    let backend = InMemoryBackend::with_order(picking.clone());
    backend.reject_with(409);
    let harness = Harness::new(backend);
    let control = harness.open(picking.id).await;

    let result = control.select(OrderStatus::Packed).await;

    match result {
        Err(TransitionError::Backend(error)) => assert!(error.is_conflict()),
        other => panic!("expected backend rejection, got {other:?}"),
    }
    assert_eq!(harness.backend.updates().len(), 1);
    assert_eq!(control.displayed_status(), OrderStatus::Picking);
    assert_eq!(harness.cache.is_stale(&QueryKey::Order(picking.id)), Some(false));
    assert_eq!(
        harness.notifications.drain(),
        vec![Notification::Error(STATUS_UPDATE_FAILED.to_string())]
    );
    assert!(!control.is_pending());
}

#[tokio::test]
async fn control_opened_from_a_list_row_follows_the_refetch() {
    let picking = order(OrderStatus::Picking);
    let harness = Harness::new(InMemoryBackend::with_order(picking.clone()));
    let page = harness
        .cache
        .fetch_orders(harness.backend.as_ref(), &OrderQuery::default())
        .await
        .unwrap();
    let control = TransitionControl::new(Arc::clone(&harness.command), &page.data[0]);

    control.select(OrderStatus::Packed).await.unwrap();

    let row = harness.cache.get_orders(&OrderQuery::default()).unwrap().data[0].status;
    assert_eq!(row, OrderStatus::Packed);
    assert_eq!(control.displayed_status(), row);
    assert_eq!(
        control.options(),
        &[OrderStatus::Shipped, OrderStatus::OnHold, OrderStatus::Cancelled]
    );
    assert_eq!(
        harness.cache.get_order(picking.id).unwrap().status,
        OrderStatus::Packed
    );

    let again = control.select(OrderStatus::Packed).await;
    assert!(matches!(again, Err(TransitionError::NotOffered { .. })));
    assert_eq!(harness.backend.updates(), vec![(picking.id, OrderStatus::Packed)]);
}

#[tokio::test]
async fn retry_after_rejection_can_succeed() {
    let picking = order(OrderStatus::Picking);
    let backend = InMemoryBackend::with_order(picking.clone());
    backend.reject_with(409);
    let harness = Harness::new(backend);
    let control = harness.open(picking.id).await;

    assert!(control.select(OrderStatus::Packed).await.is_err());
    *harness.backend.reject_with.lock().unwrap() = None;
    assert!(control.select(OrderStatus::Packed).await.is_ok());

    assert_eq!(harness.backend.updates().len(), 2);
    assert_eq!(control.displayed_status(), OrderStatus::Packed);
}

#[tokio::test]
async fn terminal_order_has_no_control() {
    for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
        let done = order(status);
        let harness = Harness::new(InMemoryBackend::with_order(done.clone()));
        let control = harness.open(done.id).await;

        assert!(!control.is_visible());
        assert!(control.options().is_empty());
    }
}

#[tokio::test]
async fn unoffered_target_is_refused_without_a_request() {
    let draft = order(OrderStatus::Draft);
    let harness = Harness::new(InMemoryBackend::with_order(draft.clone()));
    let control = harness.open(draft.id).await;

    let result = control.select(OrderStatus::Shipped).await;

    assert!(matches!(result, Err(TransitionError::NotOffered { .. })));
    assert!(harness.backend.updates().is_empty());
    assert_eq!(control.displayed_status(), OrderStatus::Draft);
    assert_eq!(
        harness.notifications.drain(),
        vec![Notification::Error(STATUS_UPDATE_FAILED.to_string())]
    );
}

#[tokio::test]
async fn missing_order_is_a_recoverable_failure() {
    let harness = Harness::new(InMemoryBackend::default());
    let ghost = order(OrderStatus::Confirmed);
    let control = TransitionControl::new(Arc::clone(&harness.command), &ghost);

    let result = control.select(OrderStatus::Sourcing).await;

    assert!(matches!(
        result,
        Err(TransitionError::Backend(BackendError::NotFound))
    ));
    assert_eq!(control.displayed_status(), OrderStatus::Confirmed);
}

#[tokio::test]
async fn control_is_disabled_while_a_change_is_in_flight() {
    let picking = order(OrderStatus::Picking);
    let gate = Arc::new(Notify::new());
    let mut backend = InMemoryBackend::with_order(picking.clone());
    backend.gate = Some(Arc::clone(&gate));
    let harness = Harness::new(backend);
    let control = harness.open(picking.id).await;

    let first = control.select(OrderStatus::Packed);
    let second = async {
        tokio::task::yield_now().await;
        assert!(control.is_pending());
        let result = control.select(OrderStatus::Cancelled).await;
        gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(matches!(second, Err(TransitionError::InFlight)));
    assert_eq!(harness.backend.updates(), vec![(picking.id, OrderStatus::Packed)]);
    assert!(!control.is_pending());
}

#[tokio::test]
async fn unmounted_view_gets_no_notification_but_cache_is_refreshed() {
    let picking = order(OrderStatus::Picking);
    let gate = Arc::new(Notify::new());
    let mut backend = InMemoryBackend::with_order(picking.clone());
    backend.gate = Some(Arc::clone(&gate));
    let harness = Harness::new(backend);
    let control = harness.open(picking.id).await;

    let change = control.select(OrderStatus::Packed);
    let navigate_away = async {
        tokio::task::yield_now().await;
        control.unmount();
        gate.notify_one();
    };
    let (result, ()) = tokio::join!(change, navigate_away);

    assert!(result.is_ok());
    assert!(harness.notifications.is_empty());
    assert_eq!(
        harness.cache.get_order(picking.id).unwrap().status,
        OrderStatus::Packed
    );
}
