// src/models/tour.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Admin-configured exclusive tour variant. Only active rows can be booked.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomTour {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub capacity: i64,
    pub is_active: bool,
}

/// Tour classification. Everything except `Normal` occupies the whole boat
/// for its slot, regardless of actual headcount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum TourType {
    Normal,
    Private,
    FishingSwimming,
    Custom(String),
}

impl TourType {
    /// Canonical string stored in the reservation row. Custom tours store
    /// their registry id directly, matching the original document shapes.
    pub fn as_str(&self) -> &str {
        match self {
            TourType::Normal => "normal",
            TourType::Private => "private",
            TourType::FishingSwimming => "fishing-swimming",
            TourType::Custom(id) => id,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "normal" => TourType::Normal,
            "private" => TourType::Private,
            "fishing-swimming" => TourType::FishingSwimming,
            other => TourType::Custom(other.to_string()),
        }
    }

    pub fn is_exclusive(&self) -> bool {
        !matches!(self, TourType::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_strings_round_trip() {
        for t in [
            TourType::Normal,
            TourType::Private,
            TourType::FishingSwimming,
            TourType::Custom("sunset-cruise".into()),
        ] {
            assert_eq!(TourType::parse(t.as_str()), t);
        }
    }

    #[test]
    fn only_normal_is_non_exclusive() {
        assert!(!TourType::Normal.is_exclusive());
        assert!(TourType::Private.is_exclusive());
        assert!(TourType::FishingSwimming.is_exclusive());
        assert!(TourType::Custom("x".into()).is_exclusive());
    }
}
