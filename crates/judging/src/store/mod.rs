//! Contracts of the two stores the review workflow writes to.
//!
//! The Postgres adapters back a live session; the in-memory ones serve dry
//! runs and tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::ranking::RankSlot;
use crate::rating::Rating;

pub use memory::{MemoryRankingStore, MemoryScoreStore, ScoreWrite};
pub use postgres::{PgRankingStore, PgScoreStore};

/// Durable per-submission score records for one judge.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Idempotent full overwrite of the record for `submission_id`.
    async fn upsert_review(
        &self,
        submission_id: Uuid,
        rating: Option<Rating>,
        feedback: &str,
    ) -> Result<(), StoreError>;
}

/// Durable top-3 assignments per (category, judge).
#[async_trait]
pub trait RankingStore: Send + Sync {
    async fn get_rankings(
        &self,
        category_id: Uuid,
        judge_id: Uuid,
    ) -> Result<Vec<RankingEntry>, StoreError>;

    /// Atomically replaces the previous assignment with `entries`.
    async fn save_rankings(
        &self,
        category_id: Uuid,
        judge_id: Uuid,
        entries: &[RankingEntry],
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankingEntry {
    pub slot: RankSlot,
    pub submission_id: Uuid,
}

impl RankingEntry {
    pub fn new(slot: RankSlot, submission_id: Uuid) -> Self {
        Self {
            slot,
            submission_id,
        }
    }

    pub fn rank(&self) -> i16 {
        self.slot.rank()
    }
}
