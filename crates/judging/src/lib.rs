pub mod config;
pub mod error;
pub mod navigation;
pub mod ranking;
pub mod rating;
pub mod save_controller;
pub mod store;
pub mod submission;

pub use config::JudgingConfig;
pub use error::{InvalidRating, NavigationError, RankingError, StoreError};
pub use navigation::{NavigationGate, NavigationOutcome, NavigationWarning};
pub use ranking::{RankSlot, RankingEngine, drag::{DragSession, DropTarget}};
pub use rating::{Rating, RatingTier};
pub use save_controller::{FlushOutcome, SaveController, SaveStatus};
pub use store::{RankingEntry, RankingStore, ScoreStore};
pub use submission::{ReviewSubmission, ScoreDraft};
