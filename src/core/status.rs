//! Order status values.
//!
//! `OrderStatus` is the lifecycle stage of an order. Its wire names and
//! display labels are the only format contract shared with the backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle stage of an order.
///
/// Serialized as the upper-case wire name (`"ON_HOLD"`, `"DRAFT"`, ...).
///
/// # Example
///
/// ```rust
/// use order_lifecycle::core::OrderStatus;
///
/// let status: OrderStatus = "on_hold".parse().unwrap();
/// assert_eq!(status, OrderStatus::OnHold);
/// assert_eq!(status.as_str(), "ON_HOLD");
/// assert_eq!(status.label(), "On Hold");
/// assert!(!status.is_terminal());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Sourcing,
    Picking,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
    OnHold,
}

impl OrderStatus {
    /// Number of status values.
    pub const COUNT: usize = 9;

    /// Every status, in the order the console lists them.
    pub const ALL: [OrderStatus; Self::COUNT] = [
        Self::Draft,
        Self::Confirmed,
        Self::Sourcing,
        Self::Picking,
        Self::Packed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::OnHold,
    ];

    /// Wire name, as sent to and received from the backend.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Confirmed => "CONFIRMED",
            Self::Sourcing => "SOURCING",
            Self::Picking => "PICKING",
            Self::Packed => "PACKED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::OnHold => "ON_HOLD",
        }
    }

    /// Human readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Confirmed => "Confirmed",
            Self::Sourcing => "Sourcing",
            Self::Picking => "Picking",
            Self::Packed => "Packed",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::OnHold => "On Hold",
        }
    }

    /// Position of this status in [`OrderStatus::ALL`].
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Terminal statuses accept no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Orders are created as drafts by the backend.
    pub const fn is_initial(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known order status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown order status '{value}'")]
pub struct ParseStatusError {
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseStatusError {
                value: s.to_string(),
            })
    }
}
