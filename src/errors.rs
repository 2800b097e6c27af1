// Copyright 2025 Cowboy AI, LLC.

//! Error types for dispatch operations

use crate::identifiers::RideId;
use thiserror::Error;

/// Errors that can occur in dispatch operations
///
/// Every variant has a stable kind (see [`DispatchError::kind`]) so the
/// transport layer can map errors to response codes without string matching.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller lacks rights over the ride
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Unknown ride id
    #[error("Ride not found: {0}")]
    NotFound(RideId),

    /// Illegal state transition, including a lost accept race
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unresolvable place name - fatal to quoting
    #[error("Geocoding failed for '{place}': {message}")]
    Geocoding {
        /// The free-text place name that could not be resolved
        place: String,
        /// Error message from the resolver
        message: String,
    },

    /// Computed price was not a finite positive number
    #[error("Pricing error: {0}")]
    Pricing(String),

    /// Non-geocoding collaborator failure
    ///
    /// The pricing engine recovers from this kind locally by substituting a
    /// zero surcharge; it only reaches callers from collaborator adapters
    /// used outside the degradable pricing path.
    #[error("External service error: {service} - {message}")]
    ExternalService {
        /// Name of the external service
        service: String,
        /// Error message from the service
        message: String,
    },
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DispatchError::Validation(msg.into())
    }

    /// Create an authorization error
    pub fn authorization(msg: impl Into<String>) -> Self {
        DispatchError::Authorization(msg.into())
    }

    /// Create a conflict error for an illegal state transition
    pub fn invalid_transition(from: &str, to: &str) -> Self {
        DispatchError::Conflict(format!(
            "invalid state transition from {from} to {to}"
        ))
    }

    /// Create an external service error
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        DispatchError::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Stable kind name for transport mapping
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Validation(_) => "validation",
            DispatchError::Authorization(_) => "authorization",
            DispatchError::NotFound(_) => "not_found",
            DispatchError::Conflict(_) => "conflict",
            DispatchError::Geocoding { .. } => "geocoding",
            DispatchError::Pricing(_) => "pricing",
            DispatchError::ExternalService { .. } => "external_service",
        }
    }
}
