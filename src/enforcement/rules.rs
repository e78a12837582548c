//! Transition checks using Validation.

use crate::core::{OrderStatus, TransitionTable};
use crate::enforcement::context::StatusChangeRequest;
use crate::enforcement::violations::ViolationError;
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Checked = Validation<(), NonEmptyVec<ViolationError>>;

fn require(ok: bool, violation: impl FnOnce() -> ViolationError) -> Checked {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Check a status change against `table`, accumulating ALL violations.
pub fn check_request(table: &TransitionTable, request: &StatusChangeRequest) -> Checked {
    let (from, to) = (request.from, request.to);

    let checks = vec![
        require(!table.is_terminal(from), || ViolationError::TerminalStatus {
            status: from,
        }),
        require(from != to, || ViolationError::SelfTransition { status: from }),
        require(table.can_transition(from, to), || {
            ViolationError::NotOffered { from, to }
        }),
    ];

    Validation::all_vec(checks).map(|_| ())
}

/// Check a transition table in wire form, accumulating ALL violations.
pub fn check_table(entries: &HashMap<String, Vec<String>>) -> Checked {
    let mut checks: Vec<Checked> = Vec::new();

    let mut keys: Vec<&String> = entries.keys().collect();
    keys.sort();

    let present: Vec<OrderStatus> = keys.iter().filter_map(|k| k.parse().ok()).collect();
    for status in OrderStatus::ALL {
        checks.push(require(present.contains(&status), || {
            ViolationError::MissingEntry { status }
        }));
    }

    // Names are case-insensitive, so "PICKING" and "picking" collide.
    let mut seen_keys: Vec<OrderStatus> = Vec::with_capacity(keys.len());
    for key in keys {
        let targets = &entries[key];
        let from = match key.parse::<OrderStatus>() {
            Ok(from) => from,
            Err(_) => {
                checks.push(Validation::fail(ViolationError::UnknownStatus {
                    value: key.clone(),
                }));
                continue;
            }
        };
        checks.push(require(!seen_keys.contains(&from), || {
            ViolationError::DuplicateEntry { status: from }
        }));
        seen_keys.push(from);

        checks.push(require(!from.is_terminal() || targets.is_empty(), || {
            ViolationError::TerminalHasEdges { status: from }
        }));

        let mut seen: Vec<OrderStatus> = Vec::with_capacity(targets.len());
        for raw in targets {
            let to = match raw.parse::<OrderStatus>() {
                Ok(to) => to,
                Err(_) => {
                    checks.push(Validation::fail(ViolationError::UnknownStatus {
                        value: raw.clone(),
                    }));
                    continue;
                }
            };
            checks.push(require(to != from, || ViolationError::SelfTransition {
                status: from,
            }));
            checks.push(require(!seen.contains(&to), || ViolationError::DuplicateEdge {
                from,
                to,
            }));
            seen.push(to);
        }
    }

    Validation::all_vec(checks).map(|_| ())
}
