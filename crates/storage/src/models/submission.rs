use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Submission {
    pub submission_id: Uuid,
    pub category_id: Uuid,
    pub media_url: String,
    pub participant_code: String,
    pub disqualified: bool,
    pub created_at: chrono::NaiveDateTime,
}
