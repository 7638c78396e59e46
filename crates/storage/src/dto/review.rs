use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const MAX_FEEDBACK_LENGTH: u64 = 5000;

/// Full overwrite of a judge's score record. An absent rating clears it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertReviewRequest {
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: Option<i16>,

    #[validate(length(
        max = MAX_FEEDBACK_LENGTH,
        message = "Feedback must be at most 5000 characters"
    ))]
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub submission_id: Uuid,
    pub judge_id: Uuid,
    pub rating: Option<i16>,
    pub feedback: String,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<crate::models::Review> for ReviewResponse {
    fn from(review: crate::models::Review) -> Self {
        Self {
            submission_id: review.submission_id,
            judge_id: review.judge_id,
            rating: review.rating,
            feedback: review.feedback,
            updated_at: review.updated_at,
        }
    }
}

/// A submission together with one judge's current score state.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SubmissionForReview {
    pub submission_id: Uuid,
    pub media_url: String,
    pub participant_code: String,
    pub disqualified: bool,
    pub rating: Option<i16>,
    pub feedback: String,
}
