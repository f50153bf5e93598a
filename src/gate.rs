//! Idle/in-flight guard for operations that must not overlap.
//!
//! A trigger that finds its operation in flight is dropped, not queued.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    Idle,
    InFlight,
}

#[derive(Debug, Default)]
pub struct OperationGate {
    in_flight: AtomicBool,
}

impl OperationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the gate to `InFlight`, or returns `None` if it already is.
    /// The gate returns to `Idle` when the permit drops.
    pub fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight { gate: self })
    }

    pub fn state(&self) -> OperationState {
        if self.in_flight.load(Ordering::Acquire) {
            OperationState::InFlight
        } else {
            OperationState::Idle
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state() == OperationState::InFlight
    }
}

#[derive(Debug)]
pub struct InFlight<'a> {
    gate: &'a OperationGate,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}
