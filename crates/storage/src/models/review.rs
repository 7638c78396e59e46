use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A judge's score record for one submission. Every save overwrites the whole row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub submission_id: Uuid,
    pub judge_id: Uuid,
    pub rating: Option<i16>,
    pub feedback: String,
    pub updated_at: chrono::NaiveDateTime,
}
