use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::review::SubmissionForReview;
use crate::error::{Result, StorageError};
use crate::models::Submission;

pub struct SubmissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubmissionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, submission_id: Uuid) -> Result<Submission> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            SELECT submission_id, category_id, media_url, participant_code,
                   disqualified, created_at
            FROM submissions
            WHERE submission_id = $1
            "#,
        )
        .bind(submission_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(submission)
    }

    /// Submissions of a category joined with one judge's score state, in review order.
    pub async fn list_for_review(
        &self,
        category_id: Uuid,
        judge_id: Uuid,
    ) -> Result<Vec<SubmissionForReview>> {
        let submissions = sqlx::query_as::<_, SubmissionForReview>(
            r#"
            SELECT s.submission_id, s.media_url, s.participant_code, s.disqualified,
                   r.rating, COALESCE(r.feedback, '') AS feedback
            FROM submissions s
            LEFT JOIN reviews r
                ON r.submission_id = s.submission_id AND r.judge_id = $2
            WHERE s.category_id = $1
            ORDER BY s.created_at, s.submission_id
            "#,
        )
        .bind(category_id)
        .bind(judge_id)
        .fetch_all(self.pool)
        .await?;

        Ok(submissions)
    }
}
