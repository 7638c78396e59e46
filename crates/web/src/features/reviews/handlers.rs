use axum::{
    Json,
    extract::{Path, State},
};
use storage::{
    Database,
    models::Submission,
    dto::review::{ReviewResponse, SubmissionForReview, UpsertReviewRequest},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiResult;
use crate::features::CategoryJudgePath;

use super::services;

#[utoipa::path(
    get,
    path = "/api/categories/{category_id}/judges/{judge_id}/submissions",
    params(CategoryJudgePath),
    responses(
        (status = 200, description = "Submissions of the category with the judge's current scores", body = Vec<SubmissionForReview>)
    ),
    tag = "reviews"
)]
pub async fn list_submissions(
    State(db): State<Database>,
    Path(path): Path<CategoryJudgePath>,
) -> ApiResult<Json<Vec<SubmissionForReview>>> {
    let submissions = services::list_for_review(db.pool(), path.category_id, path.judge_id).await?;

    Ok(Json(submissions))
}

#[utoipa::path(
    get,
    path = "/api/submissions/{submission_id}",
    params(
        ("submission_id" = Uuid, Path, description = "Submission ID")
    ),
    responses(
        (status = 200, description = "Submission found", body = Submission),
        (status = 404, description = "Submission not found")
    ),
    tag = "reviews"
)]
pub async fn get_submission(
    State(db): State<Database>,
    Path(submission_id): Path<Uuid>,
) -> ApiResult<Json<Submission>> {
    let submission = services::get_submission(db.pool(), submission_id).await?;

    Ok(Json(submission))
}

#[utoipa::path(
    get,
    path = "/api/submissions/{submission_id}/reviews/{judge_id}",
    params(
        ("submission_id" = Uuid, Path, description = "Submission being scored"),
        ("judge_id" = Uuid, Path, description = "Judge owning the score record")
    ),
    responses(
        (status = 200, description = "Score record found", body = ReviewResponse),
        (status = 404, description = "The judge has not scored this submission")
    ),
    tag = "reviews"
)]
pub async fn get_review(
    State(db): State<Database>,
    Path((submission_id, judge_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ReviewResponse>> {
    let review = services::get_review(db.pool(), submission_id, judge_id).await?;

    Ok(Json(ReviewResponse::from(review)))
}

#[utoipa::path(
    put,
    path = "/api/submissions/{submission_id}/reviews/{judge_id}",
    params(
        ("submission_id" = Uuid, Path, description = "Submission being scored"),
        ("judge_id" = Uuid, Path, description = "Judge owning the score record")
    ),
    request_body = UpsertReviewRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Score record written", body = ReviewResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found")
    ),
    tag = "reviews"
)]
pub async fn upsert_review(
    State(db): State<Database>,
    Path((submission_id, judge_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpsertReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    req.validate()?;

    let review = services::upsert_review(db.pool(), submission_id, judge_id, &req).await?;

    Ok(Json(ReviewResponse::from(review)))
}
