//! Legal order status transitions.
//!
//! The table here only decides which status changes are offered to an
//! operator. The backend order service is the authority on legality and
//! re-validates every change.

use super::status::OrderStatus;
use crate::enforcement::{check_table, join_violations, ViolationError};
use std::collections::HashMap;
use stillwater::validation::Validation;
use thiserror::Error;

/// Statuses reachable from `status` in one step, in presentation order.
///
/// Exhaustive over [`OrderStatus`], so a new status cannot be added without
/// deciding its outgoing edges.
pub const fn order_transitions(status: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match status {
        Draft => &[Confirmed, Cancelled],
        Confirmed => &[Sourcing, OnHold, Cancelled],
        Sourcing => &[Picking, OnHold, Cancelled],
        Picking => &[Packed, OnHold, Cancelled],
        Packed => &[Shipped, OnHold, Cancelled],
        Shipped => &[Delivered],
        Delivered => &[],
        Cancelled => &[],
        OnHold => &[Confirmed, Sourcing, Picking, Packed, Cancelled],
    }
}

/// Valid next statuses for `status` according to the builtin table.
///
/// Total and pure: every status yields a (possibly empty) sequence.
///
/// # Example
///
/// ```rust
/// use order_lifecycle::core::{valid_transitions, OrderStatus};
///
/// assert_eq!(
///     valid_transitions(OrderStatus::Draft),
///     &[OrderStatus::Confirmed, OrderStatus::Cancelled]
/// );
/// assert!(valid_transitions(OrderStatus::Delivered).is_empty());
/// ```
pub fn valid_transitions(status: OrderStatus) -> &'static [OrderStatus] {
    order_transitions(status)
}

/// A transition table received from elsewhere failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid transition table: {}", join_violations(.violations))]
pub struct InvalidTable {
    pub violations: Vec<ViolationError>,
}

/// Immutable, total mapping from each status to its outgoing statuses.
///
/// Built once (from the builtin table or from the backend) and then shared
/// read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionTable {
    edges: [Vec<OrderStatus>; OrderStatus::COUNT],
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TransitionTable {
    /// Table mirroring the backend state machine as known at build time.
    pub fn builtin() -> Self {
        Self {
            edges: std::array::from_fn(|i| order_transitions(OrderStatus::ALL[i]).to_vec()),
        }
    }

    /// Build a table from its wire form, e.g. `{"DRAFT": ["CONFIRMED", ...]}`.
    ///
    /// All problems are reported together. A table that is not total, names
    /// unknown statuses, lists a status twice, gives a terminal status outgoing
    /// edges, or contains self-loops or duplicate edges is rejected.
    pub fn from_wire(entries: &HashMap<String, Vec<String>>) -> Result<Self, InvalidTable> {
        match check_table(entries) {
            Validation::Success(_) => {}
            Validation::Failure(errors) => {
                return Err(InvalidTable {
                    violations: errors.iter().cloned().collect(),
                })
            }
        }

        let mut edges: [Vec<OrderStatus>; OrderStatus::COUNT] = Default::default();
        for (from, targets) in entries {
            let from = parse_checked(from)?;
            edges[from.index()] = targets
                .iter()
                .map(|target| parse_checked(target))
                .collect::<Result<Vec<_>, _>>()?;
        }
        Ok(Self { edges })
    }

    /// Valid next statuses for `status`, in presentation order.
    pub fn valid_transitions(&self, status: OrderStatus) -> &[OrderStatus] {
        &self.edges[status.index()]
    }

    /// Lookup by wire name. Unknown values have no transitions.
    ///
    /// ```rust
    /// use order_lifecycle::core::TransitionTable;
    ///
    /// let table = TransitionTable::builtin();
    /// assert_eq!(table.valid_transitions_for("SHIPPED").len(), 1);
    /// assert!(table.valid_transitions_for("RETURNED").is_empty());
    /// ```
    pub fn valid_transitions_for(&self, raw: &str) -> &[OrderStatus] {
        match raw.parse::<OrderStatus>() {
            Ok(status) => self.valid_transitions(status),
            Err(_) => {
                tracing::debug!(status = raw, "no transitions for unknown order status");
                &[]
            }
        }
    }

    /// Whether `to` is offered from `from`.
    pub fn can_transition(&self, from: OrderStatus, to: OrderStatus) -> bool {
        self.valid_transitions(from).contains(&to)
    }

    /// Whether `status` has no outgoing transitions in this table.
    pub fn is_terminal(&self, status: OrderStatus) -> bool {
        self.valid_transitions(status).is_empty()
    }
}

// Names were already checked by `check_table`; this only turns a missed case
// into an error instead of a panic.
fn parse_checked(raw: &str) -> Result<OrderStatus, InvalidTable> {
    raw.parse().map_err(|_| InvalidTable {
        violations: vec![ViolationError::UnknownStatus {
            value: raw.to_string(),
        }],
    })
}
