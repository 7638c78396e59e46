use thiserror::Error;
use uuid::Uuid;

use crate::rating::Rating;
use crate::ranking::RankSlot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Rating must be between 1 and 10, got {0}")]
pub struct InvalidRating(pub i64);

/// A store call that did not go through. Always recoverable by the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::error::StorageError),

    #[error("Store rejected the write: {0}")]
    Rejected(String),

    #[error("Stored data is invalid: {0}")]
    InvalidData(String),
}

impl From<InvalidRating> for StoreError {
    fn from(error: InvalidRating) -> Self {
        Self::InvalidData(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Select a rating before moving on to the next submission")]
    RatingRequired,

    #[error("Submission {0} is not part of this review")]
    NotFound(Uuid),

    #[error("There are no submissions to review")]
    EmptyWorkingSet,
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error(
        "A lower-scored submission cannot outrank a higher-scored one: \
         {higher} place is rated {higher_rating} but {lower} place is rated {lower_rating}"
    )]
    OrderViolation {
        higher: RankSlot,
        higher_rating: Rating,
        lower: RankSlot,
        lower_rating: Rating,
    },

    #[error("Submission {0} is not in this category")]
    NotFound(Uuid),

    #[error("Submission {0} is disqualified and cannot be ranked")]
    Disqualified(Uuid),

    #[error("All 3 places must be filled before saving ({filled} of 3 filled)")]
    Incomplete { filled: usize },

    #[error("Rankings could not be saved: {0}")]
    Store(#[from] StoreError),
}
