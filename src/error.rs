use std::fmt;

use crate::id_generator::ElementId;

/// Errors that can occur during drag state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A drag started while another one is still in flight
    InvalidStateTransition {
        from: &'static str,
        to: &'static str,
    },
    /// The element asked to be dragged is not in the store
    MissingElement(ElementId),
    /// The element is locked in place
    LockedElement(ElementId),
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to } =>
                write!(f, "Cannot transition from {} to {}", from, to),
            Self::MissingElement(id) =>
                write!(f, "Cannot drag missing element {}", id),
            Self::LockedElement(id) =>
                write!(f, "Element {} is locked", id),
        }
    }
}

impl std::error::Error for TransitionError {}
