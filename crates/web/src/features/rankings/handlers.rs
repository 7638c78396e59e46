use axum::{
    Json,
    extract::{Path, State},
};
use storage::{
    Database,
    dto::ranking::{RankingEntryDto, RankingsResponse, SaveRankingsRequest},
};
use validator::Validate;

use crate::error::{ApiResult, WebError};
use crate::features::CategoryJudgePath;

use super::services;

#[utoipa::path(
    get,
    path = "/api/categories/{category_id}/judges/{judge_id}/rankings",
    params(CategoryJudgePath),
    responses(
        (status = 200, description = "The judge's saved top-3, empty when nothing was saved yet", body = RankingsResponse)
    ),
    tag = "rankings"
)]
pub async fn get_rankings(
    State(db): State<Database>,
    Path(path): Path<CategoryJudgePath>,
) -> ApiResult<Json<RankingsResponse>> {
    let rankings = services::get_rankings(db.pool(), path.category_id, path.judge_id).await?;

    Ok(Json(RankingsResponse {
        category_id: path.category_id,
        judge_id: path.judge_id,
        entries: rankings.into_iter().map(RankingEntryDto::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/categories/{category_id}/judges/{judge_id}/rankings",
    params(CategoryJudgePath),
    request_body = SaveRankingsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Top-3 replaced", body = RankingsResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not in this category"),
        (status = 409, description = "Ordering violated or submission disqualified")
    ),
    tag = "rankings"
)]
pub async fn save_rankings(
    State(db): State<Database>,
    Path(path): Path<CategoryJudgePath>,
    Json(req): Json<SaveRankingsRequest>,
) -> ApiResult<Json<RankingsResponse>> {
    req.validate()?;

    req.validate_entries()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let saved = services::save_rankings(&db, path.category_id, path.judge_id, &req).await?;

    Ok(Json(RankingsResponse {
        category_id: path.category_id,
        judge_id: path.judge_id,
        entries: saved
            .into_iter()
            .map(|entry| RankingEntryDto {
                rank: entry.rank(),
                submission_id: entry.submission_id,
            })
            .collect(),
    }))
}
