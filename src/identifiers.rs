// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for rides and the people party to them

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ride ID - globally unique identity of one transportation request
///
/// Assigned once at ride creation and immutable for the life of the ride,
/// including after it reaches a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RideId(Uuid);

impl RideId {
    /// Create a new random ride ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RideId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RideId> for Uuid {
    fn from(id: RideId) -> Self {
        id.0
    }
}

impl From<&RideId> for Uuid {
    fn from(id: &RideId) -> Self {
        id.0
    }
}

/// User ID - identity of a rider or driver
///
/// Riders and drivers live in the same account space (the user service owns
/// registration and roles; this crate only compares identities). A ride's
/// rider and assigned driver are both `UserId`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl From<&UserId> for Uuid {
    fn from(id: &UserId) -> Self {
        id.0
    }
}
