//! Violation errors reported by transition checks.

use crate::core::OrderStatus;
use thiserror::Error;

/// Problems found when checking a status change or a transition table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViolationError {
    #[error("Order is {status}, which is terminal")]
    TerminalStatus { status: OrderStatus },

    #[error("Status {status} cannot transition to itself")]
    SelfTransition { status: OrderStatus },

    #[error("Transition from {from} to {to} is not offered")]
    NotOffered { from: OrderStatus, to: OrderStatus },

    #[error("Unknown order status '{value}'")]
    UnknownStatus { value: String },

    #[error("No transition entry for {status}")]
    MissingEntry { status: OrderStatus },

    #[error("Transition entry for {status} is given more than once")]
    DuplicateEntry { status: OrderStatus },

    #[error("Terminal status {status} has outgoing transitions")]
    TerminalHasEdges { status: OrderStatus },

    #[error("Transition from {from} to {to} is listed more than once")]
    DuplicateEdge { from: OrderStatus, to: OrderStatus },
}

pub(crate) fn join_violations(violations: &[ViolationError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
