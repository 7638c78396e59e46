use std::sync::Arc;

use judging::{
    RankSlot, RankingEngine, RankingEntry, ReviewSubmission, ranking::RankCandidate,
    store::PgRankingStore,
};
use sqlx::PgPool;
use storage::{
    Database,
    dto::ranking::SaveRankingsRequest,
    error::Result,
    models::Ranking,
    repository::{ranking::RankingRepository, submission::SubmissionRepository},
};
use uuid::Uuid;

use crate::error::{ApiResult, WebError};

/// Current top-3 of a judge, best first
pub async fn get_rankings(pool: &PgPool, category_id: Uuid, judge_id: Uuid) -> Result<Vec<Ranking>> {
    let repo = RankingRepository::new(pool);
    repo.find(category_id, judge_id).await
}

/// Replace a judge's top-3 after checking it against the stored ratings.
///
/// The assignment goes through the same placement rules the review client
/// applies: disqualified or foreign submissions are refused, and no placed
/// submission may be rated below one placed beneath it.
pub async fn save_rankings(
    db: &Database,
    category_id: Uuid,
    judge_id: Uuid,
    req: &SaveRankingsRequest,
) -> ApiResult<Vec<RankingEntry>> {
    let candidates = SubmissionRepository::new(db.pool())
        .list_for_review(category_id, judge_id)
        .await?
        .into_iter()
        .map(|row| ReviewSubmission::try_from(row).map(|s| RankCandidate::from(&s)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| WebError::InternalServerError(e.to_string()))?;

    let store = Arc::new(PgRankingStore::new(db.clone()));
    let mut engine = RankingEngine::new(category_id, judge_id, candidates, store);

    for entry in &req.entries {
        let slot = RankSlot::from_rank(entry.rank)
            .ok_or_else(|| WebError::BadRequest("Rank must be 1, 2 or 3".to_string()))?;
        engine.place(entry.submission_id, slot)?;
    }

    Ok(engine.save().await?)
}
