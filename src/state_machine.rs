// Copyright 2025 Cowboy AI, LLC.

//! Ride lifecycle state machine
//!
//! The ride status machine is enum-based with controlled transitions:
//! states declare their legal successors and the registry refuses anything
//! else. Terminal states accept no further transitions, so completed and
//! canceled rides are immutable history.

use crate::errors::{DispatchError, DispatchResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;

/// Trait for types that can be used as states in a state machine
pub trait State: Debug + Clone + PartialEq + Eq + Send + Sync {
    /// Get the name of this state for logging/debugging
    fn name(&self) -> &'static str;

    /// Check if this is a terminal state
    fn is_terminal(&self) -> bool {
        false
    }

    /// Check if a transition to the target state is valid
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Get all valid target states from this state
    fn valid_transitions(&self) -> Vec<Self>;

    /// Validate a transition, yielding a conflict error when it is illegal
    fn ensure_transition_to(&self, target: &Self) -> DispatchResult<()> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DispatchError::invalid_transition(
                self.name(),
                target.name(),
            ))
        }
    }
}

/// Lifecycle status of a ride
///
/// ```text
/// pending ──▶ accepted ──▶ completed
///    │            │
///    └────────────┴──────▶ canceled
/// ```
///
/// `Completed` and `Canceled` are terminal; no transition leaves them.
///
/// # Examples
///
/// ```rust
/// use ride_dispatch::{RideStatus, State};
///
/// assert!(RideStatus::Pending.can_transition_to(&RideStatus::Accepted));
/// assert!(RideStatus::Accepted.can_transition_to(&RideStatus::Canceled));
/// assert!(!RideStatus::Pending.can_transition_to(&RideStatus::Completed));
/// assert!(RideStatus::Canceled.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    /// Created by the rider, waiting for a driver
    Pending,
    /// A driver has been assigned and is en route
    Accepted,
    /// The assigned driver finished the ride
    Completed,
    /// Either party canceled before completion
    Canceled,
}

impl State for RideStatus {
    fn name(&self) -> &'static str {
        match self {
            RideStatus::Pending => "pending",
            RideStatus::Accepted => "accepted",
            RideStatus::Completed => "completed",
            RideStatus::Canceled => "canceled",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Canceled)
    }

    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (RideStatus::Pending, RideStatus::Accepted)
                | (RideStatus::Pending, RideStatus::Canceled)
                | (RideStatus::Accepted, RideStatus::Completed)
                | (RideStatus::Accepted, RideStatus::Canceled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            RideStatus::Pending => vec![RideStatus::Accepted, RideStatus::Canceled],
            RideStatus::Accepted => vec![RideStatus::Completed, RideStatus::Canceled],
            RideStatus::Completed | RideStatus::Canceled => vec![],
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
