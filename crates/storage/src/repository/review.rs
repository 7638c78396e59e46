use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::review::UpsertReviewRequest;
use crate::error::{Result, StorageError};
use crate::models::Review;

/// Repository for judge score records
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the score record a judge left on a submission
    pub async fn find(&self, submission_id: Uuid, judge_id: Uuid) -> Result<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT submission_id, judge_id, rating, feedback, updated_at
            FROM reviews
            WHERE submission_id = $1 AND judge_id = $2
            "#,
        )
        .bind(submission_id)
        .bind(judge_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(review)
    }

    /// Create or fully overwrite a score record
    pub async fn upsert(
        &self,
        submission_id: Uuid,
        judge_id: Uuid,
        req: &UpsertReviewRequest,
    ) -> Result<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (submission_id, judge_id, rating, feedback, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (submission_id, judge_id)
            DO UPDATE SET
                rating = EXCLUDED.rating,
                feedback = EXCLUDED.feedback,
                updated_at = NOW()
            RETURNING submission_id, judge_id, rating, feedback, updated_at
            "#,
        )
        .bind(submission_id)
        .bind(judge_id)
        .bind(req.rating)
        .bind(&req.feedback)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_constraint("Rating must be between 1 and 10"))?;

        Ok(review)
    }
}
