//! Top-3 placement for one (category, judge) pair.
//!
//! Every mutation is checked against the ordering rule before it is
//! committed: a submission placed higher never has a lower rating than one
//! placed below it. Unrated submissions are wildcards.

pub mod drag;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::RankingError;
use crate::rating::{Rating, RatingTier};
use crate::store::{RankingEntry, RankingStore};
use crate::submission::ReviewSubmission;

pub const SLOT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankSlot {
    First,
    Second,
    Third,
}

impl RankSlot {
    pub const ALL: [RankSlot; SLOT_COUNT] = [Self::First, Self::Second, Self::Third];

    /// 1-based award position.
    pub fn rank(self) -> i16 {
        self.index() as i16 + 1
    }

    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }

    pub fn from_rank(rank: i16) -> Option<Self> {
        match rank {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            _ => None,
        }
    }
}

impl fmt::Display for RankSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::First => "1st",
            Self::Second => "2nd",
            Self::Third => "3rd",
        };
        f.write_str(label)
    }
}

/// A submission that may be dragged into a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankCandidate {
    pub submission_id: Uuid,
    pub participant_code: String,
    pub rating: Option<Rating>,
    pub disqualified: bool,
}

impl From<&ReviewSubmission> for RankCandidate {
    fn from(submission: &ReviewSubmission) -> Self {
        Self {
            submission_id: submission.submission_id,
            participant_code: submission.participant_code.clone(),
            rating: submission.score.rating,
            disqualified: submission.disqualified,
        }
    }
}

pub struct RankingEngine {
    category_id: Uuid,
    judge_id: Uuid,
    candidates: Vec<RankCandidate>,
    slots: [Option<Uuid>; SLOT_COUNT],
    /// Set by the first local placement or removal; persisted data no longer re-seeds slots.
    has_local_override: bool,
    store: Arc<dyn RankingStore>,
}

impl RankingEngine {
    pub fn new(
        category_id: Uuid,
        judge_id: Uuid,
        candidates: Vec<RankCandidate>,
        store: Arc<dyn RankingStore>,
    ) -> Self {
        Self {
            category_id,
            judge_id,
            candidates,
            slots: [None; SLOT_COUNT],
            has_local_override: false,
            store,
        }
    }

    /// Loads the persisted assignment into the slots.
    pub async fn hydrate(&mut self) -> Result<(), RankingError> {
        let entries = self
            .store
            .get_rankings(self.category_id, self.judge_id)
            .await?;
        self.refresh_persisted(&entries);
        Ok(())
    }

    /// Applies persisted entries unless the judge already changed the slots locally.
    /// Returns whether the slots were re-seeded.
    pub fn refresh_persisted(&mut self, entries: &[RankingEntry]) -> bool {
        if self.has_local_override {
            debug!(
                category_id = %self.category_id,
                "Ignoring persisted rankings, local changes take precedence"
            );
            return false;
        }

        let mut slots = [None; SLOT_COUNT];
        for entry in entries {
            let placeable = self
                .candidate(entry.submission_id)
                .is_some_and(|c| !c.disqualified);
            let duplicate = slots.contains(&Some(entry.submission_id));

            if placeable && !duplicate {
                slots[entry.slot.index()] = Some(entry.submission_id);
            } else {
                warn!(
                    submission_id = %entry.submission_id,
                    slot = %entry.slot,
                    "Skipping persisted ranking entry"
                );
            }
        }

        self.slots = slots;
        true
    }

    /// Replaces the candidate list after ratings or disqualifications changed.
    /// Slots whose occupant is gone, disqualified, or now out of order are
    /// cleared, lowest violating slot first. Returns the cleared slots.
    pub fn update_candidates(&mut self, candidates: Vec<RankCandidate>) -> Vec<RankSlot> {
        self.candidates = candidates;
        let mut cleared = Vec::new();

        for slot in RankSlot::ALL {
            let Some(submission_id) = self.slots[slot.index()] else {
                continue;
            };
            let placeable = self
                .candidate(submission_id)
                .is_some_and(|c| !c.disqualified);
            if !placeable {
                self.slots[slot.index()] = None;
                cleared.push(slot);
            }
        }

        while let Err(RankingError::OrderViolation { lower, .. }) = self.check_order(&self.slots) {
            self.slots[lower.index()] = None;
            cleared.push(lower);
        }

        for slot in &cleared {
            warn!(
                category_id = %self.category_id,
                %slot,
                "Cleared ranking slot after candidates changed"
            );
        }
        cleared.sort();
        cleared
    }

    /// Puts `submission_id` into `slot`, moving it out of any other slot.
    /// The previous occupant of `slot` becomes unassigned.
    pub fn place(&mut self, submission_id: Uuid, slot: RankSlot) -> Result<(), RankingError> {
        let candidate = self
            .candidate(submission_id)
            .ok_or(RankingError::NotFound(submission_id))?;
        if candidate.disqualified {
            return Err(RankingError::Disqualified(submission_id));
        }

        let mut proposed = self.slots;
        for occupant in proposed.iter_mut() {
            if *occupant == Some(submission_id) {
                *occupant = None;
            }
        }
        proposed[slot.index()] = Some(submission_id);

        if let Err(e) = self.check_order(&proposed) {
            warn!(%submission_id, %slot, error = %e, "Placement rejected");
            return Err(e);
        }

        self.slots = proposed;
        self.has_local_override = true;
        Ok(())
    }

    /// Clears `slot`, returning its previous occupant.
    pub fn remove(&mut self, slot: RankSlot) -> Option<Uuid> {
        self.has_local_override = true;
        self.slots[slot.index()].take()
    }

    pub fn slot(&self, slot: RankSlot) -> Option<Uuid> {
        self.slots[slot.index()]
    }

    pub fn slot_of(&self, submission_id: Uuid) -> Option<RankSlot> {
        RankSlot::ALL
            .into_iter()
            .find(|slot| self.slots[slot.index()] == Some(submission_id))
    }

    pub fn slots(&self) -> [Option<Uuid>; SLOT_COUNT] {
        self.slots
    }

    pub fn has_local_override(&self) -> bool {
        self.has_local_override
    }

    pub fn candidate(&self, submission_id: Uuid) -> Option<&RankCandidate> {
        self.candidates
            .iter()
            .find(|c| c.submission_id == submission_id)
    }

    /// Unplaced, non-disqualified candidates, best rated first. Ties keep input order.
    pub fn source_pool(&self) -> Vec<&RankCandidate> {
        let mut pool: Vec<&RankCandidate> = self
            .candidates
            .iter()
            .filter(|c| !c.disqualified && self.slot_of(c.submission_id).is_none())
            .collect();
        pool.sort_by(|a, b| b.rating.cmp(&a.rating));
        pool
    }

    /// Other rated, non-disqualified candidates in the same rating tier as `submission_id`.
    pub fn comparable_with(&self, submission_id: Uuid) -> Vec<&RankCandidate> {
        let Some(rating) = self.rating_of(Some(submission_id)) else {
            return Vec::new();
        };
        self.candidates
            .iter()
            .filter(|c| c.submission_id != submission_id && !c.disqualified)
            .filter(|c| c.rating.is_some_and(|r| RatingTier::comparable(rating, r)))
            .collect()
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn can_save(&self) -> bool {
        self.filled() == SLOT_COUNT
    }

    /// Filled slots as store entries, best first.
    pub fn entries(&self) -> Vec<RankingEntry> {
        RankSlot::ALL
            .into_iter()
            .filter_map(|slot| self.slot(slot).map(|id| RankingEntry::new(slot, id)))
            .collect()
    }

    /// Sends the full assignment to the store in one call. Slots are untouched on failure.
    pub async fn save(&mut self) -> Result<Vec<RankingEntry>, RankingError> {
        if !self.can_save() {
            return Err(RankingError::Incomplete {
                filled: self.filled(),
            });
        }
        // Hydrated data may predate a rating change.
        self.check_order(&self.slots)?;

        let entries = self.entries();
        if let Err(e) = self
            .store
            .save_rankings(self.category_id, self.judge_id, &entries)
            .await
        {
            warn!(
                category_id = %self.category_id,
                judge_id = %self.judge_id,
                error = %e,
                "Saving rankings failed"
            );
            return Err(RankingError::Store(e));
        }

        info!(
            category_id = %self.category_id,
            judge_id = %self.judge_id,
            "Rankings saved"
        );
        Ok(entries)
    }

    fn rating_of(&self, submission_id: Option<Uuid>) -> Option<Rating> {
        submission_id
            .and_then(|id| self.candidate(id))
            .and_then(|c| c.rating)
    }

    fn check_order(&self, slots: &[Option<Uuid>; SLOT_COUNT]) -> Result<(), RankingError> {
        for (i, higher) in RankSlot::ALL.into_iter().enumerate() {
            let Some(higher_rating) = self.rating_of(slots[higher.index()]) else {
                continue;
            };
            for lower in RankSlot::ALL.into_iter().skip(i + 1) {
                if let Some(lower_rating) = self.rating_of(slots[lower.index()])
                    && higher_rating < lower_rating
                {
                    return Err(RankingError::OrderViolation {
                        higher,
                        higher_rating,
                        lower,
                        lower_rating,
                    });
                }
            }
        }
        Ok(())
    }
}
