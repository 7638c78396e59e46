use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{RankingEntry, RankingStore, ScoreStore};
use crate::error::StoreError;
use crate::rating::Rating;
use crate::submission::ScoreDraft;

/// One `upsert_review` call as it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreWrite {
    pub submission_id: Uuid,
    pub rating: Option<Rating>,
    pub feedback: String,
}

#[derive(Debug, Default)]
struct ScoreState {
    records: HashMap<Uuid, ScoreDraft>,
    writes: Vec<ScoreWrite>,
    in_flight: usize,
    max_in_flight: usize,
    failure: Option<String>,
}

/// Score store held in process memory, with optional simulated latency.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    latency: Duration,
    state: Mutex<ScoreState>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    fn state(&self) -> MutexGuard<'_, ScoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every following write fail with `reason`, or succeed again with `None`.
    pub fn set_failure(&self, reason: Option<&str>) {
        self.state().failure = reason.map(str::to_string);
    }

    pub fn record(&self, submission_id: Uuid) -> Option<ScoreDraft> {
        self.state().records.get(&submission_id).cloned()
    }

    /// Every write attempt, in the order it was issued.
    pub fn writes(&self) -> Vec<ScoreWrite> {
        self.state().writes.clone()
    }

    /// Highest number of writes that were outstanding at the same time.
    pub fn max_concurrent_writes(&self) -> usize {
        self.state().max_in_flight
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn upsert_review(
        &self,
        submission_id: Uuid,
        rating: Option<Rating>,
        feedback: &str,
    ) -> Result<(), StoreError> {
        {
            let mut state = self.state();
            state.writes.push(ScoreWrite {
                submission_id,
                rating,
                feedback: feedback.to_string(),
            });
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut state = self.state();
        state.in_flight -= 1;
        if let Some(reason) = &state.failure {
            return Err(StoreError::Rejected(reason.clone()));
        }
        state
            .records
            .insert(submission_id, ScoreDraft::new(rating, feedback));

        Ok(())
    }
}

#[derive(Debug, Default)]
struct RankingState {
    assignments: HashMap<(Uuid, Uuid), Vec<RankingEntry>>,
    saves: Vec<Vec<RankingEntry>>,
    failure: Option<String>,
}

/// Ranking store held in process memory. Saves swap the whole assignment under one lock.
#[derive(Debug, Default)]
pub struct MemoryRankingStore {
    latency: Duration,
    state: Mutex<RankingState>,
}

impl MemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    fn state(&self) -> MutexGuard<'_, RankingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed(&self, category_id: Uuid, judge_id: Uuid, entries: Vec<RankingEntry>) {
        self.state()
            .assignments
            .insert((category_id, judge_id), entries);
    }

    pub fn set_failure(&self, reason: Option<&str>) {
        self.state().failure = reason.map(str::to_string);
    }

    pub fn assignment(&self, category_id: Uuid, judge_id: Uuid) -> Vec<RankingEntry> {
        self.state()
            .assignments
            .get(&(category_id, judge_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Payload of every `save_rankings` call, in order.
    pub fn saves(&self) -> Vec<Vec<RankingEntry>> {
        self.state().saves.clone()
    }
}

#[async_trait]
impl RankingStore for MemoryRankingStore {
    async fn get_rankings(
        &self,
        category_id: Uuid,
        judge_id: Uuid,
    ) -> Result<Vec<RankingEntry>, StoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut entries = self.assignment(category_id, judge_id);
        entries.sort_by_key(RankingEntry::rank);
        Ok(entries)
    }

    async fn save_rankings(
        &self,
        category_id: Uuid,
        judge_id: Uuid,
        entries: &[RankingEntry],
    ) -> Result<(), StoreError> {
        self.state().saves.push(entries.to_vec());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut state = self.state();
        if let Some(reason) = &state.failure {
            return Err(StoreError::Rejected(reason.clone()));
        }
        state
            .assignments
            .insert((category_id, judge_id), entries.to_vec());

        Ok(())
    }
}
