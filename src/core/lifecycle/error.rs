use thiserror::Error;
use uuid::Uuid;

use super::status::{BookingStatus, Role};

/// Why a requested transition did not happen. The stored booking is left in
/// its prior status in every case.
#[derive(Error, Debug)]
pub enum TransitionError {
    #[error("Booking not found: {booking_id}")]
    NotFound { booking_id: Uuid },

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("Role {role} may not move a booking from {from} to {to}")]
    Forbidden {
        role: Role,
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Booking {booking_id} changed concurrently: expected {expected}, found {actual}")]
    ConcurrentModification {
        booking_id: Uuid,
        expected: BookingStatus,
        actual: BookingStatus,
    },

    /// The store itself failed; not a lifecycle outcome.
    #[error("Booking store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionErrorKind {
    NotFound,
    InvalidTransition,
    Forbidden,
    ConcurrentModification,
    Store,
}

impl TransitionError {
    pub fn kind(&self) -> TransitionErrorKind {
        match self {
            TransitionError::NotFound { .. } => TransitionErrorKind::NotFound,
            TransitionError::InvalidTransition { .. } => TransitionErrorKind::InvalidTransition,
            TransitionError::Forbidden { .. } => TransitionErrorKind::Forbidden,
            TransitionError::ConcurrentModification { .. } => {
                TransitionErrorKind::ConcurrentModification
            }
            TransitionError::Store(_) => TransitionErrorKind::Store,
        }
    }
}

pub type TransitionResult<T> = Result<T, TransitionError>;
