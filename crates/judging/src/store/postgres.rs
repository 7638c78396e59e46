use async_trait::async_trait;
use storage::{
    Database,
    dto::{ranking::RankingEntryDto, review::UpsertReviewRequest},
    repository::{ranking::RankingRepository, review::ReviewRepository},
};
use uuid::Uuid;

use super::{RankingEntry, RankingStore, ScoreStore};
use crate::error::StoreError;
use crate::ranking::RankSlot;
use crate::rating::Rating;

/// Score records of one judge, kept in Postgres.
#[derive(Debug, Clone)]
pub struct PgScoreStore {
    db: Database,
    judge_id: Uuid,
}

impl PgScoreStore {
    pub fn new(db: Database, judge_id: Uuid) -> Self {
        Self { db, judge_id }
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn upsert_review(
        &self,
        submission_id: Uuid,
        rating: Option<Rating>,
        feedback: &str,
    ) -> Result<(), StoreError> {
        let request = UpsertReviewRequest {
            rating: rating.map(i16::from),
            feedback: feedback.to_string(),
        };

        ReviewRepository::new(self.db.pool())
            .upsert(submission_id, self.judge_id, &request)
            .await?;

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgRankingStore {
    db: Database,
}

impl PgRankingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RankingStore for PgRankingStore {
    async fn get_rankings(
        &self,
        category_id: Uuid,
        judge_id: Uuid,
    ) -> Result<Vec<RankingEntry>, StoreError> {
        let rows = RankingRepository::new(self.db.pool())
            .find(category_id, judge_id)
            .await?;

        rows.into_iter()
            .map(|row| {
                RankSlot::from_rank(row.rank)
                    .map(|slot| RankingEntry::new(slot, row.submission_id))
                    .ok_or_else(|| StoreError::InvalidData(format!("rank {} out of range", row.rank)))
            })
            .collect()
    }

    async fn save_rankings(
        &self,
        category_id: Uuid,
        judge_id: Uuid,
        entries: &[RankingEntry],
    ) -> Result<(), StoreError> {
        let entries: Vec<RankingEntryDto> = entries
            .iter()
            .map(|entry| RankingEntryDto {
                rank: entry.rank(),
                submission_id: entry.submission_id,
            })
            .collect();

        RankingRepository::new(self.db.pool())
            .replace_all(category_id, judge_id, &entries)
            .await?;

        Ok(())
    }
}
