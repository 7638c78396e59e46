use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidRating;

/// A judge's score for one submission, always within 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self, InvalidRating> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidRating(i64::from(value)))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn tier(self) -> RatingTier {
        RatingTier::of(self)
    }
}

impl TryFrom<i16> for Rating {
    type Error = InvalidRating;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| InvalidRating(i64::from(value)))
            .and_then(Self::new)
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        i16::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed bands of the rating scale, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingTier {
    NeedsWork,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl RatingTier {
    pub const ALL: [RatingTier; 5] = [
        Self::NeedsWork,
        Self::Fair,
        Self::Good,
        Self::VeryGood,
        Self::Excellent,
    ];

    pub fn of(rating: Rating) -> Self {
        match rating.value() {
            1..=2 => Self::NeedsWork,
            3..=4 => Self::Fair,
            5..=6 => Self::Good,
            7..=8 => Self::VeryGood,
            _ => Self::Excellent,
        }
    }

    /// Inclusive (low, high) bounds of the band.
    pub fn bounds(self) -> (u8, u8) {
        match self {
            Self::NeedsWork => (1, 2),
            Self::Fair => (3, 4),
            Self::Good => (5, 6),
            Self::VeryGood => (7, 8),
            Self::Excellent => (9, 10),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NeedsWork => "Needs Work",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::VeryGood => "Very Good",
            Self::Excellent => "Excellent",
        }
    }

    /// Ratings selectable within the band.
    pub fn ratings(self) -> impl Iterator<Item = Rating> {
        let (low, high) = self.bounds();
        (low..=high).map(Rating)
    }

    /// Two ratings are comparable when they fall in the same band.
    pub fn comparable(a: Rating, b: Rating) -> bool {
        Self::of(a) == Self::of(b)
    }
}

impl fmt::Display for RatingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (low, high) = self.bounds();
        write!(f, "{} ({}-{})", self.label(), low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(10).is_ok());
        assert!(Rating::new(11).is_err());
        assert!(Rating::try_from(-3i16).is_err());
        assert_eq!(i16::from(Rating::try_from(7i16).unwrap()), 7);
    }

    #[test]
    fn test_tiers_partition_the_scale() {
        let mut covered = Vec::new();
        for tier in RatingTier::ALL {
            for rating in tier.ratings() {
                assert_eq!(rating.tier(), tier);
                covered.push(rating.value());
            }
        }
        assert_eq!(covered, (1..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_tier_labels_and_comparability() {
        let nine = Rating::new(9).unwrap();
        let ten = Rating::new(10).unwrap();
        let eight = Rating::new(8).unwrap();

        assert_eq!(nine.tier().label(), "Excellent");
        assert_eq!(RatingTier::VeryGood.to_string(), "Very Good (7-8)");
        assert!(RatingTier::comparable(nine, ten));
        assert!(!RatingTier::comparable(eight, nine));
    }
}
