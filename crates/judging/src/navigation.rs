//! Movement between the submissions of a review pass.
//!
//! Going back is always allowed. Going forward needs a rating on the current
//! submission. Either way the current edit is flushed before the move.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::NavigationError;
use crate::ranking::RankCandidate;
use crate::rating::Rating;
use crate::save_controller::{FlushOutcome, SaveController};
use crate::submission::ReviewSubmission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationWarning {
    /// Forward navigation was refused because the current submission has no rating.
    RatingRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Moved {
        from: usize,
        to: usize,
        flush: FlushOutcome,
    },
    /// No submission further forward; the edit was still flushed.
    ReachedEnd { flush: FlushOutcome },
    ReachedStart { flush: FlushOutcome },
}

impl NavigationOutcome {
    pub fn flush(&self) -> &FlushOutcome {
        match self {
            Self::Moved { flush, .. } | Self::ReachedEnd { flush } | Self::ReachedStart { flush } => {
                flush
            }
        }
    }
}

pub struct NavigationGate {
    submissions: Vec<ReviewSubmission>,
    current: usize,
    controller: SaveController,
    warning: Option<NavigationWarning>,
}

impl NavigationGate {
    /// Starts a review pass on `start`, or on the first submission.
    pub async fn open(
        submissions: Vec<ReviewSubmission>,
        controller: SaveController,
        start: Option<Uuid>,
    ) -> Result<Self, NavigationError> {
        if submissions.is_empty() {
            return Err(NavigationError::EmptyWorkingSet);
        }

        let current = match start {
            Some(id) => submissions
                .iter()
                .position(|s| s.submission_id == id)
                .ok_or(NavigationError::NotFound(id))?,
            None => 0,
        };

        controller.load(&submissions[current]).await;

        Ok(Self {
            submissions,
            current,
            controller,
            warning: None,
        })
    }

    pub fn current(&self) -> &ReviewSubmission {
        &self.submissions[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn controller(&self) -> &SaveController {
        &self.controller
    }

    pub fn warning(&self) -> Option<NavigationWarning> {
        self.warning
    }

    pub fn feedback_changed(&self, text: impl Into<String>) {
        self.controller.feedback_changed(text);
    }

    pub fn feedback_blurred(&self) {
        self.controller.feedback_blurred();
    }

    pub fn rating_selected(&mut self, rating: Rating) {
        self.controller.rating_selected(rating);
        self.warning = None;
    }

    pub async fn navigate_previous(&mut self) -> NavigationOutcome {
        match self.current.checked_sub(1) {
            Some(target) => self.move_to(target).await,
            None => NavigationOutcome::ReachedStart {
                flush: self.stay().await,
            },
        }
    }

    pub async fn navigate_next(&mut self) -> Result<NavigationOutcome, NavigationError> {
        self.require_rating()?;

        let target = self.current + 1;
        if target < self.submissions.len() {
            Ok(self.move_to(target).await)
        } else {
            Ok(NavigationOutcome::ReachedEnd {
                flush: self.stay().await,
            })
        }
    }

    /// Jumps forward to the next submission that has no rating yet.
    pub async fn navigate_next_unreviewed(&mut self) -> Result<NavigationOutcome, NavigationError> {
        self.require_rating()?;

        let target = self
            .submissions
            .iter()
            .enumerate()
            .skip(self.current + 1)
            .find(|(_, s)| !s.is_reviewed())
            .map(|(i, _)| i);

        match target {
            Some(target) => Ok(self.move_to(target).await),
            None => Ok(NavigationOutcome::ReachedEnd {
                flush: self.stay().await,
            }),
        }
    }

    /// Jumps to a submission by id. Moving to a later submission counts as forward.
    pub async fn navigate_to(&mut self, submission_id: Uuid) -> Result<NavigationOutcome, NavigationError> {
        let target = self
            .submissions
            .iter()
            .position(|s| s.submission_id == submission_id)
            .ok_or(NavigationError::NotFound(submission_id))?;

        if target > self.current {
            self.require_rating()?;
        }
        Ok(self.move_to(target).await)
    }

    /// Reviewed and total submission counts, including unsaved edits.
    pub fn progress(&self) -> (usize, usize) {
        let reviewed = (0..self.submissions.len())
            .filter(|&i| self.is_reviewed(i))
            .count();
        (reviewed, self.submissions.len())
    }

    /// Ranking opens once every submission carries a rating.
    pub fn all_reviewed(&self) -> bool {
        let (reviewed, total) = self.progress();
        reviewed == total
    }

    /// Submissions with their latest local scores, for the ranking step.
    pub fn ranking_candidates(&self) -> Vec<RankCandidate> {
        self.submissions
            .iter()
            .enumerate()
            .map(|(i, submission)| {
                let mut candidate = RankCandidate::from(submission);
                if i == self.current {
                    candidate.rating = self.controller.local().rating;
                }
                candidate
            })
            .collect()
    }

    fn is_reviewed(&self, index: usize) -> bool {
        if index == self.current {
            self.controller.local().rating.is_some()
        } else {
            self.submissions[index].is_reviewed()
        }
    }

    fn require_rating(&mut self) -> Result<(), NavigationError> {
        if self.controller.local().rating.is_some() {
            return Ok(());
        }

        info!(
            submission_id = %self.current().submission_id,
            "Forward navigation refused, rating missing"
        );
        self.warning = Some(NavigationWarning::RatingRequired);
        Err(NavigationError::RatingRequired)
    }

    /// Copies the buffer and the acknowledged record of the current submission
    /// back into the working set. Call after flushing.
    fn sync_current(&mut self) {
        let current = &mut self.submissions[self.current];
        current.score = self.controller.local();
        current.saved = self.controller.persisted();
    }

    async fn stay(&mut self) -> FlushOutcome {
        let flush = self.controller.flush().await;
        self.sync_current();
        flush
    }

    async fn move_to(&mut self, target: usize) -> NavigationOutcome {
        let from = self.current;
        let flush = self.controller.flush().await;
        self.sync_current();

        if let FlushOutcome::Failed(error) = &flush {
            warn!(
                submission_id = %self.submissions[from].submission_id,
                %error,
                "Left submission with an unsaved edit"
            );
        }
        self.controller.seed(&self.submissions[target]);

        self.current = target;
        self.warning = None;

        NavigationOutcome::Moved {
            from,
            to: target,
            flush,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::JudgingConfig;
    use crate::store::MemoryScoreStore;
    use crate::submission::ScoreDraft;

    fn rating(value: u8) -> Rating {
        Rating::new(value).unwrap()
    }

    fn submissions(ratings: &[Option<u8>]) -> Vec<ReviewSubmission> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, r)| {
                ReviewSubmission::new(
                    Uuid::new_v4(),
                    format!("https://cdn.example.org/{i}.jpg"),
                    format!("P-{i:03}"),
                    false,
                    ScoreDraft::new(r.map(rating), ""),
                )
            })
            .collect()
    }

    async fn gate(ratings: &[Option<u8>]) -> (NavigationGate, Arc<MemoryScoreStore>) {
        let store = Arc::new(MemoryScoreStore::new());
        let controller = SaveController::new(store.clone(), JudgingConfig::default());
        let gate = NavigationGate::open(submissions(ratings), controller, None)
            .await
            .unwrap();
        (gate, store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_forward_refused_without_rating() {
        let (mut gate, _) = gate(&[None, None]).await;

        assert_eq!(gate.navigate_next().await, Err(NavigationError::RatingRequired));
        assert_eq!(gate.warning(), Some(NavigationWarning::RatingRequired));
        assert_eq!(gate.current_index(), 0);

        gate.rating_selected(rating(6));
        assert_eq!(gate.warning(), None);

        let outcome = gate.navigate_next().await.unwrap();
        assert_eq!(
            outcome,
            NavigationOutcome::Moved {
                from: 0,
                to: 1,
                flush: FlushOutcome::Saved
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backward_always_allowed_and_flushes() {
        let (mut gate, store) = gate(&[Some(4), None]).await;
        gate.navigate_next().await.unwrap();

        gate.feedback_changed("half written");
        let outcome = gate.navigate_previous().await;

        assert!(matches!(outcome, NavigationOutcome::Moved { from: 1, to: 0, .. }));
        let second = gate.submissions[1].submission_id;
        assert_eq!(
            store.record(second),
            Some(ScoreDraft::new(None, "half written"))
        );
        assert_eq!(gate.submissions[1].score.feedback, "half written");
    }

    #[tokio::test(start_paused = true)]
    async fn test_boundaries() {
        let (mut gate, _) = gate(&[Some(5)]).await;

        assert_eq!(
            gate.navigate_previous().await,
            NavigationOutcome::ReachedStart {
                flush: FlushOutcome::Clean
            }
        );
        assert_eq!(
            gate.navigate_next().await,
            Ok(NavigationOutcome::ReachedEnd {
                flush: FlushOutcome::Clean
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_unreviewed_skips_scored() {
        let (mut gate, _) = gate(&[Some(3), Some(8), None, None]).await;

        let outcome = gate.navigate_next_unreviewed().await.unwrap();
        assert!(matches!(outcome, NavigationOutcome::Moved { to: 2, .. }));

        assert_eq!(
            gate.navigate_next_unreviewed().await,
            Err(NavigationError::RatingRequired)
        );

        gate.rating_selected(rating(7));
        let outcome = gate.navigate_next_unreviewed().await.unwrap();
        assert!(matches!(outcome, NavigationOutcome::Moved { from: 2, to: 3, .. }));

        gate.rating_selected(rating(2));
        assert!(matches!(
            gate.navigate_next_unreviewed().await,
            Ok(NavigationOutcome::ReachedEnd { .. })
        ));
        assert!(gate.all_reviewed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_to_respects_direction() {
        let (mut gate, _) = gate(&[None, None, None]).await;
        let last = gate.submissions[2].submission_id;
        let first = gate.submissions[0].submission_id;

        assert_eq!(gate.navigate_to(last).await, Err(NavigationError::RatingRequired));

        gate.rating_selected(rating(9));
        gate.navigate_to(last).await.unwrap();
        assert_eq!(gate.current_index(), 2);

        // Backward works even though the current submission is unrated.
        gate.navigate_to(first).await.unwrap();
        assert_eq!(gate.current_index(), 0);

        let stranger = Uuid::new_v4();
        assert_eq!(
            gate.navigate_to(stranger).await,
            Err(NavigationError::NotFound(stranger))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_flush_is_reported_on_move() {
        let (mut gate, store) = gate(&[Some(5), None]).await;
        store.set_failure(Some("timeout"));

        gate.feedback_changed("lost?");
        let outcome = gate.navigate_next().await.unwrap();

        assert_eq!(
            outcome.flush(),
            &FlushOutcome::Failed("Store rejected the write: timeout".to_string())
        );
        // The edit survives in the working set.
        assert_eq!(gate.submissions[0].score.feedback, "lost?");
        assert!(gate.submissions[0].has_unsaved_edit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_edit_is_resent_after_returning() {
        let (mut gate, store) = gate(&[Some(5), None]).await;
        let first = gate.submissions[0].submission_id;
        store.set_failure(Some("offline"));

        gate.feedback_changed("new text");
        let outcome = gate.navigate_next().await.unwrap();
        assert!(matches!(outcome.flush(), FlushOutcome::Failed(_)));

        store.set_failure(None);
        gate.navigate_previous().await;
        assert_eq!(gate.controller().local().feedback, "new text");
        assert!(gate.controller().is_dirty());

        gate.feedback_blurred();
        let outcome = gate.navigate_next().await.unwrap();
        assert_eq!(outcome.flush(), &FlushOutcome::Saved);
        assert_eq!(
            store.record(first),
            Some(ScoreDraft::new(Some(rating(5)), "new text"))
        );
        assert!(!gate.submissions[0].has_unsaved_edit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_edit_is_resent_by_next_move() {
        let (mut gate, store) = gate(&[Some(2), Some(9)]).await;
        let first = gate.submissions[0].submission_id;
        store.set_failure(Some("offline"));

        gate.rating_selected(rating(3));
        gate.navigate_next().await.unwrap();
        store.set_failure(None);

        gate.navigate_previous().await;
        let outcome = gate.navigate_next().await.unwrap();

        assert_eq!(outcome.flush(), &FlushOutcome::Saved);
        assert_eq!(store.record(first), Some(ScoreDraft::new(Some(rating(3)), "")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_counts_unsaved_rating() {
        let (mut gate, _) = gate(&[None, Some(3)]).await;
        assert_eq!(gate.progress(), (1, 2));

        gate.rating_selected(rating(10));
        assert_eq!(gate.progress(), (2, 2));

        let candidates = gate.ranking_candidates();
        assert_eq!(candidates[0].rating, Some(rating(10)));
    }

    #[tokio::test]
    async fn test_open_errors() {
        let store = Arc::new(MemoryScoreStore::new());
        let controller = SaveController::new(store, JudgingConfig::default());
        assert!(matches!(
            NavigationGate::open(Vec::new(), controller.clone(), None).await,
            Err(NavigationError::EmptyWorkingSet)
        ));

        let missing = Uuid::new_v4();
        assert!(matches!(
            NavigationGate::open(submissions(&[None]), controller, Some(missing)).await,
            Err(NavigationError::NotFound(id)) if id == missing
        ));
    }
}
