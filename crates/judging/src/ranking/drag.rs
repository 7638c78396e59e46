use std::str::FromStr;

use uuid::Uuid;

use super::{RankSlot, RankingEngine};
use crate::error::RankingError;

/// Where a dragged submission can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Slot(RankSlot),
    /// Back to the unranked pool.
    Pool,
}

impl FromStr for DropTarget {
    type Err = String;

    /// Accepts the target ids the drag surface uses: `slot-1`..`slot-3` and `pool`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "pool" {
            return Ok(Self::Pool);
        }

        s.strip_prefix("slot-")
            .and_then(|rank| rank.parse::<i16>().ok())
            .and_then(RankSlot::from_rank)
            .map(Self::Slot)
            .ok_or_else(|| format!("unknown drop target '{}'", s))
    }
}

/// Tracks the item being dragged and turns drops into engine operations.
#[derive(Debug, Default)]
pub struct DragSession {
    dragging: Option<Uuid>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_drag(&mut self, submission_id: Uuid) {
        self.dragging = Some(submission_id);
    }

    pub fn dragging(&self) -> Option<Uuid> {
        self.dragging
    }

    pub fn cancel_drag(&mut self) -> Option<Uuid> {
        self.dragging.take()
    }

    /// Ends the drag on `target`. Returns `Ok(false)` when nothing was being dragged.
    ///
    /// The drag ends even if the engine rejects the drop.
    pub fn drop_on_target(
        &mut self,
        engine: &mut RankingEngine,
        target: DropTarget,
    ) -> Result<bool, RankingError> {
        let Some(submission_id) = self.dragging.take() else {
            return Ok(false);
        };

        match target {
            DropTarget::Slot(slot) => engine.place(submission_id, slot)?,
            DropTarget::Pool => {
                if let Some(slot) = engine.slot_of(submission_id) {
                    engine.remove(slot);
                }
            }
        }

        Ok(true)
    }
}
