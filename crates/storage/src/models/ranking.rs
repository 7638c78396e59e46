use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Ranking {
    pub category_id: Uuid,
    pub judge_id: Uuid,
    pub rank: i16,
    pub submission_id: Uuid,
    pub created_at: chrono::NaiveDateTime,
}
