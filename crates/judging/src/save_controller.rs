//! Auto-save of a judge's rating and feedback for the submission under review.
//!
//! Feedback edits are debounced, rating selections are saved at once, and
//! blur or navigation forces an immediate flush. Every save reads the edit
//! buffer held here at dispatch time. At most one write is outstanding;
//! anything requested meanwhile collapses into a single queued payload that
//! is sent as soon as the outstanding write succeeds.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::JudgingConfig;
use crate::rating::Rating;
use crate::store::ScoreStore;
use crate::submission::{ReviewSubmission, ScoreDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
}

/// What a flush achieved once every outstanding write settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing needed saving.
    Clean,
    Saved,
    /// The last write failed; the edit is still in the local buffer.
    Failed(String),
}

#[derive(Debug, Clone)]
struct PendingSave {
    submission_id: Uuid,
    draft: ScoreDraft,
}

#[derive(Debug)]
struct EditState {
    submission_id: Option<Uuid>,
    local: ScoreDraft,
    persisted: ScoreDraft,
    /// Latest payload handed to the store, in flight or queued.
    requested: ScoreDraft,
    in_flight: bool,
    queued: Option<PendingSave>,
    debounce: Option<JoinHandle<()>>,
    debounce_seq: u64,
    saved_reset: Option<JoinHandle<()>>,
    last_error: Option<String>,
}

impl EditState {
    fn cancel_debounce(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
        self.debounce_seq += 1;
    }

    fn has_unsent_change(&self) -> bool {
        self.submission_id.is_some() && self.local != self.requested
    }
}

struct Shared {
    store: Arc<dyn ScoreStore>,
    config: JudgingConfig,
    state: Mutex<EditState>,
    status: watch::Sender<SaveStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EditState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends or queues the current buffer if it differs from what was last requested.
    /// Returns whether anything was requested.
    fn request_save(self: &Arc<Self>, state: &mut EditState) -> bool {
        if !state.has_unsent_change() {
            return false;
        }
        let Some(submission_id) = state.submission_id else {
            return false;
        };

        let pending = PendingSave {
            submission_id,
            draft: state.local.clone(),
        };
        state.requested = pending.draft.clone();

        if state.in_flight {
            debug!(%submission_id, "Save in flight, coalescing into queued payload");
            state.queued = Some(pending);
            return true;
        }

        state.in_flight = true;
        if let Some(handle) = state.saved_reset.take() {
            handle.abort();
        }
        self.status.send_replace(SaveStatus::Saving);

        let shared = Arc::clone(self);
        tokio::spawn(async move { shared.drive(pending).await });

        true
    }

    async fn drive(self: Arc<Self>, first: PendingSave) {
        let mut pending = first;

        loop {
            debug!(
                submission_id = %pending.submission_id,
                rating = ?pending.draft.rating,
                "Saving review"
            );
            let result = self
                .store
                .upsert_review(
                    pending.submission_id,
                    pending.draft.rating,
                    &pending.draft.feedback,
                )
                .await;

            let mut state = self.lock();
            match result {
                Ok(()) => {
                    state.persisted = pending.draft;
                    state.last_error = None;

                    if let Some(next) = state.queued.take() {
                        pending = next;
                        continue;
                    }

                    state.in_flight = false;
                    self.status.send_replace(SaveStatus::Saved);
                    self.schedule_saved_reset(&mut state);
                }
                Err(e) => {
                    warn!(
                        submission_id = %pending.submission_id,
                        error = %e,
                        "Review save failed, edit kept locally"
                    );
                    if state.queued.take().is_some() {
                        debug!("Dropping queued payload after failed save");
                    }
                    state.requested = state.persisted.clone();
                    state.last_error = Some(e.to_string());
                    state.in_flight = false;
                    self.status.send_replace(SaveStatus::Idle);
                }
            }
            break;
        }
    }

    fn schedule_saved_reset(self: &Arc<Self>, state: &mut EditState) {
        if let Some(handle) = state.saved_reset.take() {
            handle.abort();
        }

        let shared = Arc::clone(self);
        let window = self.config.saved_display;
        state.saved_reset = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            shared.status.send_if_modified(|status| {
                if *status == SaveStatus::Saved {
                    *status = SaveStatus::Idle;
                    true
                } else {
                    false
                }
            });
        }));
    }

    fn debounce_elapsed(self: &Arc<Self>, seq: u64) {
        let mut state = self.lock();
        if state.debounce_seq != seq {
            return;
        }
        state.debounce = None;
        self.request_save(&mut state);
    }
}

/// Save controller for the submission currently under review.
///
/// Cheap to clone; clones share the same buffer. Event methods spawn tasks and
/// must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct SaveController {
    shared: Arc<Shared>,
}

impl SaveController {
    pub fn new(store: Arc<dyn ScoreStore>, config: JudgingConfig) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);

        Self {
            shared: Arc::new(Shared {
                store,
                config,
                state: Mutex::new(EditState {
                    submission_id: None,
                    local: ScoreDraft::default(),
                    persisted: ScoreDraft::default(),
                    requested: ScoreDraft::default(),
                    in_flight: false,
                    queued: None,
                    debounce: None,
                    debounce_seq: 0,
                    saved_reset: None,
                    last_error: None,
                }),
                status,
            }),
        }
    }

    /// Flushes the previous submission, then seeds the buffer from `submission`.
    pub async fn load(&self, submission: &ReviewSubmission) -> FlushOutcome {
        let outcome = self.flush().await;
        self.seed(submission);
        outcome
    }

    /// Switches the buffer to `submission` without flushing.
    ///
    /// The buffer starts from the shown score, while the acknowledged record
    /// comes from `submission.saved`, so an edit whose save failed earlier is
    /// still dirty and goes out with the next save.
    pub fn seed(&self, submission: &ReviewSubmission) {
        let mut state = self.shared.lock();
        state.cancel_debounce();
        state.submission_id = Some(submission.submission_id);
        state.local = submission.score.clone();
        state.persisted = submission.saved.clone();
        state.requested = submission.saved.clone();
        state.last_error = None;

        if let Some(handle) = state.saved_reset.take() {
            handle.abort();
        }
        if !state.in_flight {
            self.shared.status.send_replace(SaveStatus::Idle);
        }
    }

    pub fn feedback_changed(&self, text: impl Into<String>) {
        let mut state = self.shared.lock();
        state.local.feedback = text.into();
        state.cancel_debounce();

        let seq = state.debounce_seq;
        let delay = self.shared.config.feedback_debounce;
        let shared = Arc::clone(&self.shared);
        state.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.debounce_elapsed(seq);
        }));
    }

    pub fn feedback_blurred(&self) {
        let mut state = self.shared.lock();
        state.cancel_debounce();
        self.shared.request_save(&mut state);
    }

    /// Saves at once with whatever feedback the buffer holds right now.
    pub fn rating_selected(&self, rating: Rating) {
        let mut state = self.shared.lock();
        state.local.rating = Some(rating);
        state.cancel_debounce();
        self.shared.request_save(&mut state);
    }

    /// Sends any unsent edit and waits until no write is outstanding.
    pub async fn flush(&self) -> FlushOutcome {
        let must_wait = {
            let mut state = self.shared.lock();
            state.cancel_debounce();
            let requested = self.shared.request_save(&mut state);
            requested || state.in_flight
        };

        if !must_wait {
            return FlushOutcome::Clean;
        }

        let mut status = self.shared.status.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        let _ = status.wait_for(|s| *s != SaveStatus::Saving).await;

        match self.shared.lock().last_error.clone() {
            Some(error) => FlushOutcome::Failed(error),
            None => FlushOutcome::Saved,
        }
    }

    pub fn status(&self) -> SaveStatus {
        *self.shared.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.shared.status.subscribe()
    }

    pub fn submission_id(&self) -> Option<Uuid> {
        self.shared.lock().submission_id
    }

    pub fn local(&self) -> ScoreDraft {
        self.shared.lock().local.clone()
    }

    pub fn persisted(&self) -> ScoreDraft {
        self.shared.lock().persisted.clone()
    }

    /// Local buffer differs from the last acknowledged record.
    pub fn is_dirty(&self) -> bool {
        let state = self.shared.lock();
        state.local != state.persisted
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().last_error.clone()
    }
}
