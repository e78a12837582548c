//! Order query cache.
//!
//! Holds fetched order lists and order details. After a confirmed status
//! change entries are invalidated and refetched from the backend; cached
//! orders are never patched in place, so the cache cannot drift from the
//! backend's state.

use crate::client::{BackendError, OrderBackend};
use crate::core::{OrderQuery, OrderResponse, PaginatedOrders};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// Identity of a cached query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    OrderList(OrderQuery),
    Order(Uuid),
}

/// Which entries an invalidation applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invalidate {
    /// Every order list, whatever its filters.
    OrderLists,
    /// The detail entry of one order.
    Order(Uuid),
}

impl Invalidate {
    fn matches(&self, key: &QueryKey) -> bool {
        match (self, key) {
            (Self::OrderLists, QueryKey::OrderList(_)) => true,
            (Self::Order(id), QueryKey::Order(key_id)) => id == key_id,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
enum CachedValue {
    List(PaginatedOrders),
    Order(OrderResponse),
}

#[derive(Clone, Debug)]
struct Entry {
    value: CachedValue,
    stale: bool,
    fetched_at: DateTime<Utc>,
}

impl Entry {
    fn fresh(value: CachedValue) -> Self {
        Self {
            value,
            stale: false,
            fetched_at: Utc::now(),
        }
    }
}

/// Cache of order queries, shared between the views that read orders and
/// the command that changes them.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<QueryKey, Entry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached order, stale or not.
    pub fn get_order(&self, id: Uuid) -> Option<OrderResponse> {
        match self.entries.get(&QueryKey::Order(id))?.value {
            CachedValue::Order(ref order) => Some(order.clone()),
            CachedValue::List(_) => None,
        }
    }

    /// Cached order list, stale or not.
    pub fn get_orders(&self, query: &OrderQuery) -> Option<PaginatedOrders> {
        match self.entries.get(&QueryKey::OrderList(query.clone()))?.value {
            CachedValue::List(ref page) => Some(page.clone()),
            CachedValue::Order(_) => None,
        }
    }

    /// Latest cached copy of an order: its detail entry, otherwise the row
    /// from the most recently fetched list page that contains it.
    pub fn find_order(&self, id: Uuid) -> Option<OrderResponse> {
        if let Some(order) = self.get_order(id) {
            return Some(order);
        }
        self.entries
            .iter()
            .filter_map(|entry| match &entry.value {
                CachedValue::List(page) => page
                    .data
                    .iter()
                    .find(|order| order.id == id)
                    .map(|order| (entry.fetched_at, order.clone())),
                CachedValue::Order(_) => None,
            })
            .max_by_key(|(fetched_at, _)| *fetched_at)
            .map(|(_, order)| order)
    }

    pub fn put_order(&self, order: OrderResponse) {
        self.entries
            .insert(QueryKey::Order(order.id), Entry::fresh(CachedValue::Order(order)));
    }

    pub fn put_orders(&self, query: OrderQuery, page: PaginatedOrders) {
        self.entries
            .insert(QueryKey::OrderList(query), Entry::fresh(CachedValue::List(page)));
    }

    /// `None` when the key is not cached.
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        self.entries.get(key).map(|entry| entry.stale)
    }

    /// When the entry under `key` was last fetched.
    pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.fetched_at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark matching entries stale. Returns how many entries were marked.
    pub fn invalidate(&self, filter: Invalidate) -> usize {
        let mut marked = 0;
        for mut entry in self.entries.iter_mut() {
            if filter.matches(entry.key()) {
                entry.stale = true;
                marked += 1;
            }
        }
        tracing::debug!(?filter, marked, "invalidated order queries");
        marked
    }

    /// Serve the order from cache when fresh, otherwise fetch and store it.
    pub async fn fetch_order<B>(&self, backend: &B, id: Uuid) -> Result<OrderResponse, BackendError>
    where
        B: OrderBackend + ?Sized,
    {
        if self.is_stale(&QueryKey::Order(id)) == Some(false) {
            if let Some(order) = self.get_order(id) {
                return Ok(order);
            }
        }
        let order = backend.get_order(id).await?;
        self.put_order(order.clone());
        Ok(order)
    }

    /// Serve the list from cache when fresh, otherwise fetch and store it.
    pub async fn fetch_orders<B>(
        &self,
        backend: &B,
        query: &OrderQuery,
    ) -> Result<PaginatedOrders, BackendError>
    where
        B: OrderBackend + ?Sized,
    {
        if self.is_stale(&QueryKey::OrderList(query.clone())) == Some(false) {
            if let Some(page) = self.get_orders(query) {
                return Ok(page);
            }
        }
        let page = backend.list_orders(query).await?;
        self.put_orders(query.clone(), page.clone());
        Ok(page)
    }

    /// Refetch every stale entry. Failed refetches are logged and the entry
    /// stays stale. Returns how many entries were refreshed.
    pub async fn refetch_stale<B>(&self, backend: &B) -> usize
    where
        B: OrderBackend + ?Sized,
    {
        // Collect first so no map guard is held across an await.
        let stale: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|entry| entry.stale)
            .map(|entry| entry.key().clone())
            .collect();

        let mut refreshed = 0;
        for key in stale {
            let result = match &key {
                QueryKey::Order(id) => backend.get_order(*id).await.map(|order| {
                    self.put_order(order);
                }),
                QueryKey::OrderList(query) => backend.list_orders(query).await.map(|page| {
                    self.put_orders(query.clone(), page);
                }),
            };
            match result {
                Ok(()) => refreshed += 1,
                Err(BackendError::NotFound) => {
                    self.entries.remove(&key);
                    tracing::debug!(?key, "dropped cached query for missing order");
                }
                Err(error) => tracing::warn!(?key, %error, "refetch failed, entry left stale"),
            }
        }
        refreshed
    }
}
