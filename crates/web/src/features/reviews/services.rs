use sqlx::PgPool;
use storage::{
    dto::review::{SubmissionForReview, UpsertReviewRequest},
    error::Result,
    models::{Review, Submission},
    repository::{review::ReviewRepository, submission::SubmissionRepository},
};
use uuid::Uuid;

/// Submissions of a category with one judge's scores, in review order
pub async fn list_for_review(
    pool: &PgPool,
    category_id: Uuid,
    judge_id: Uuid,
) -> Result<Vec<SubmissionForReview>> {
    let repo = SubmissionRepository::new(pool);
    repo.list_for_review(category_id, judge_id).await
}

pub async fn get_submission(pool: &PgPool, submission_id: Uuid) -> Result<Submission> {
    let repo = SubmissionRepository::new(pool);
    repo.find_by_id(submission_id).await
}

pub async fn get_review(pool: &PgPool, submission_id: Uuid, judge_id: Uuid) -> Result<Review> {
    let repo = ReviewRepository::new(pool);
    repo.find(submission_id, judge_id).await
}

/// Overwrite a judge's score record for a submission
pub async fn upsert_review(
    pool: &PgPool,
    submission_id: Uuid,
    judge_id: Uuid,
    req: &UpsertReviewRequest,
) -> Result<Review> {
    let repo = ReviewRepository::new(pool);
    let review = repo.upsert(submission_id, judge_id, req).await?;

    tracing::debug!(
        %submission_id,
        %judge_id,
        rating = ?review.rating,
        "Review stored"
    );

    Ok(review)
}
