use std::sync::Arc;
use std::time::Duration;

use judging::store::{MemoryRankingStore, MemoryScoreStore};
use judging::{
    DragSession, DropTarget, FlushOutcome, JudgingConfig, NavigationError, NavigationGate,
    NavigationOutcome, NavigationWarning, RankSlot, RankingEngine, RankingEntry, RankingError,
    Rating, ReviewSubmission, SaveController, ScoreDraft,
};
use uuid::Uuid;

fn entry(code: &str) -> ReviewSubmission {
    ReviewSubmission::new(
        Uuid::new_v4(),
        format!("https://cdn.example.org/{code}.jpg"),
        code,
        false,
        ScoreDraft::default(),
    )
}

fn rating(value: u8) -> Rating {
    Rating::new(value).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_judge_reviews_then_ranks_category() {
    let category_id = Uuid::new_v4();
    let judge_id = Uuid::new_v4();
    let submissions = vec![entry("P-001"), entry("P-002"), entry("P-003")];
    let ids: Vec<Uuid> = submissions.iter().map(|s| s.submission_id).collect();

    let scores = Arc::new(MemoryScoreStore::with_latency(Duration::from_millis(50)));
    let controller = SaveController::new(scores.clone(), JudgingConfig::default());
    let mut gate = NavigationGate::open(submissions, controller, None)
        .await
        .unwrap();

    // An unrated submission holds the judge in place.
    assert_eq!(gate.navigate_next().await, Err(NavigationError::RatingRequired));
    assert_eq!(gate.warning(), Some(NavigationWarning::RatingRequired));
    assert_eq!(gate.current_index(), 0);

    gate.feedback_changed("sharp focus");
    gate.rating_selected(rating(9));
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
    assert_eq!(
        scores.record(ids[0]),
        Some(ScoreDraft::new(Some(rating(9)), "sharp focus"))
    );

    gate.rating_selected(rating(7));
    gate.navigate_next().await.unwrap();

    // Feedback typed without blurring is flushed by backward navigation.
    gate.rating_selected(rating(5));
    gate.feedback_changed("busy background");
    let outcome = gate.navigate_previous().await;
    assert_eq!(outcome.flush(), &FlushOutcome::Saved);
    assert_eq!(gate.current_index(), 1);
    assert_eq!(
        scores.record(ids[2]),
        Some(ScoreDraft::new(Some(rating(5)), "busy background"))
    );
    assert!(gate.all_reviewed());
    assert_eq!(scores.max_concurrent_writes(), 1);

    let rankings = Arc::new(MemoryRankingStore::new());
    let mut engine = RankingEngine::new(
        category_id,
        judge_id,
        gate.ranking_candidates(),
        rankings.clone(),
    );
    engine.hydrate().await.unwrap();
    assert_eq!(engine.filled(), 0);

    let mut drag = DragSession::new();
    drag.begin_drag(ids[2]);
    drag.drop_on_target(&mut engine, DropTarget::Slot(RankSlot::First))
        .unwrap();
    drag.begin_drag(ids[0]);
    let refused = drag.drop_on_target(&mut engine, DropTarget::Slot(RankSlot::Second));
    assert!(matches!(refused, Err(RankingError::OrderViolation { .. })));
    assert!(matches!(
        engine.save().await,
        Err(RankingError::Incomplete { filled: 1 })
    ));

    engine.place(ids[0], RankSlot::First).unwrap();
    engine.place(ids[1], RankSlot::Second).unwrap();
    engine.place(ids[2], RankSlot::Third).unwrap();
    assert!(engine.can_save());
    assert!(engine.source_pool().is_empty());

    engine.save().await.unwrap();
    assert_eq!(
        rankings.assignment(category_id, judge_id),
        vec![
            RankingEntry::new(RankSlot::First, ids[0]),
            RankingEntry::new(RankSlot::Second, ids[1]),
            RankingEntry::new(RankSlot::Third, ids[2]),
        ]
    );
    assert_eq!(rankings.saves().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_saved_rankings_reload_and_failed_save_keeps_slots() {
    let category_id = Uuid::new_v4();
    let judge_id = Uuid::new_v4();
    let mut submissions = vec![entry("P-010"), entry("P-011"), entry("P-012"), entry("P-013")];
    for (submission, value) in submissions.iter_mut().zip([8, 8, 6, 3]) {
        submission.score = ScoreDraft::new(Some(rating(value)), "");
        submission.saved = submission.score.clone();
    }
    let ids: Vec<Uuid> = submissions.iter().map(|s| s.submission_id).collect();

    let rankings = Arc::new(MemoryRankingStore::new());
    rankings.seed(
        category_id,
        judge_id,
        vec![
            RankingEntry::new(RankSlot::Third, ids[2]),
            RankingEntry::new(RankSlot::First, ids[1]),
            RankingEntry::new(RankSlot::Second, ids[0]),
        ],
    );

    let controller = SaveController::new(Arc::new(MemoryScoreStore::new()), JudgingConfig::default());
    let gate = NavigationGate::open(submissions, controller, Some(ids[3]))
        .await
        .unwrap();
    assert_eq!(gate.current_index(), 3);
    assert!(gate.all_reviewed());

    let mut engine = RankingEngine::new(
        category_id,
        judge_id,
        gate.ranking_candidates(),
        rankings.clone(),
    );
    engine.hydrate().await.unwrap();
    assert_eq!(engine.slots(), [Some(ids[1]), Some(ids[0]), Some(ids[2])]);

    // Tied ratings may swap places.
    engine.place(ids[0], RankSlot::First).unwrap();
    assert_eq!(engine.slot(RankSlot::Second), None);
    engine.place(ids[1], RankSlot::Second).unwrap();

    rankings.set_failure(Some("connection reset"));
    assert!(matches!(engine.save().await, Err(RankingError::Store(_))));
    assert_eq!(engine.slots(), [Some(ids[0]), Some(ids[1]), Some(ids[2])]);

    // Persisted data no longer overrides the judge's local arrangement.
    assert!(!engine.refresh_persisted(&rankings.assignment(category_id, judge_id)));

    rankings.set_failure(None);
    engine.save().await.unwrap();
    assert_eq!(rankings.assignment(category_id, judge_id)[0].submission_id, ids[0]);
}
