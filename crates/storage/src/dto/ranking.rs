use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const RANKING_SLOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RankingEntryDto {
    pub rank: i16,
    pub submission_id: Uuid,
}

/// Replaces a judge's whole top-3 for a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveRankingsRequest {
    #[validate(length(equal = 3, message = "Exactly 3 ranking entries are required"))]
    pub entries: Vec<RankingEntryDto>,
}

impl SaveRankingsRequest {
    /// Checks what the derive cannot: ranks 1..=3 each used once, no submission twice.
    pub fn validate_entries(&self) -> Result<(), &'static str> {
        let mut ranks = HashSet::new();
        let mut submissions = HashSet::new();

        for entry in &self.entries {
            if !(1..=RANKING_SLOTS as i16).contains(&entry.rank) {
                return Err("Rank must be 1, 2 or 3");
            }
            if !ranks.insert(entry.rank) {
                return Err("Each rank may only be assigned once");
            }
            if !submissions.insert(entry.submission_id) {
                return Err("A submission may only hold one rank");
            }
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RankingsResponse {
    pub category_id: Uuid,
    pub judge_id: Uuid,
    pub entries: Vec<RankingEntryDto>,
}

impl From<crate::models::Ranking> for RankingEntryDto {
    fn from(ranking: crate::models::Ranking) -> Self {
        Self {
            rank: ranking.rank,
            submission_id: ranking.submission_id,
        }
    }
}
