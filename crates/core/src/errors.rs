use thiserror::Error;

/// The message text does not hold a readable board.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("message text does not match any known board layout")]
    UnrecognizedLayout,
    #[error("slot line {line} is not of the form `<n> - <places>`")]
    MalformedSlotLine { line: usize },
    #[error("slot line {line} is numbered `{found}`")]
    SlotIndexMismatch { line: usize, found: String },
    #[error("slot {slot} has an empty place at position {place}")]
    EmptyPlace { slot: usize, place: usize },
}

/// A well-formed board that does not allow the requested transition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransitionRejected {
    #[error("identity already holds place {place} of slot {slot}")]
    AlreadyAssigned { slot: usize, place: usize },
    #[error("slot {slot} has no free places")]
    SlotFull { slot: usize },
    #[error("slot {slot} does not exist")]
    UnknownSlot { slot: usize },
    #[error("identity holds no place to leave")]
    NothingToLeave,
}

impl TransitionRejected {
    /// True when the caller should report the target as full rather than the identity's state.
    pub fn is_capacity_rejection(&self) -> bool {
        matches!(self, Self::SlotFull { .. } | Self::UnknownSlot { .. })
    }
}
