use storage::dto::review::SubmissionForReview;
use uuid::Uuid;

use crate::error::InvalidRating;
use crate::rating::Rating;

/// The editable part of a score record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreDraft {
    pub rating: Option<Rating>,
    pub feedback: String,
}

impl ScoreDraft {
    pub fn new(rating: Option<Rating>, feedback: impl Into<String>) -> Self {
        Self {
            rating,
            feedback: feedback.into(),
        }
    }
}

/// A submission as one judge sees it during review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub submission_id: Uuid,
    pub media_url: String,
    pub participant_code: String,
    pub disqualified: bool,
    /// What the judge currently sees, possibly not yet stored.
    pub score: ScoreDraft,
    /// Last record the store acknowledged.
    pub saved: ScoreDraft,
}

impl ReviewSubmission {
    /// A submission whose score is already stored as shown.
    pub fn new(
        submission_id: Uuid,
        media_url: impl Into<String>,
        participant_code: impl Into<String>,
        disqualified: bool,
        score: ScoreDraft,
    ) -> Self {
        Self {
            submission_id,
            media_url: media_url.into(),
            participant_code: participant_code.into(),
            disqualified,
            saved: score.clone(),
            score,
        }
    }

    /// The shown score differs from the stored one.
    pub fn has_unsaved_edit(&self) -> bool {
        self.score != self.saved
    }

    pub fn is_reviewed(&self) -> bool {
        self.score.rating.is_some()
    }
}

impl TryFrom<SubmissionForReview> for ReviewSubmission {
    type Error = InvalidRating;

    fn try_from(row: SubmissionForReview) -> Result<Self, Self::Error> {
        let rating = row.rating.map(Rating::try_from).transpose()?;

        Ok(Self::new(
            row.submission_id,
            row.media_url,
            row.participant_code,
            row.disqualified,
            ScoreDraft::new(rating, row.feedback),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rating: Option<i16>) -> SubmissionForReview {
        SubmissionForReview {
            submission_id: Uuid::new_v4(),
            media_url: "https://cdn.example.org/entries/1.jpg".to_string(),
            participant_code: "P-014".to_string(),
            disqualified: false,
            rating,
            feedback: "nice framing".to_string(),
        }
    }

    #[test]
    fn test_conversion_seeds_score() {
        let submission = ReviewSubmission::try_from(row(Some(7))).unwrap();
        assert!(submission.is_reviewed());
        assert_eq!(submission.score.rating.map(Rating::value), Some(7));
        assert_eq!(submission.score.feedback, "nice framing");
        assert!(!submission.has_unsaved_edit());
    }

    #[test]
    fn test_unrated_row() {
        let submission = ReviewSubmission::try_from(row(None)).unwrap();
        assert!(!submission.is_reviewed());
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        assert_eq!(
            ReviewSubmission::try_from(row(Some(42))),
            Err(InvalidRating(42))
        );
    }
}
