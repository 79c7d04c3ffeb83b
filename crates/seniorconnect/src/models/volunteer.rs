//! Volunteer records.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest rating a volunteer can hold.
pub const MIN_RATING: f64 = 0.0;

/// Highest rating a volunteer can hold.
pub const MAX_RATING: f64 = 5.0;

/// Area of technology a volunteer is comfortable helping with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    /// Device settings.
    PhoneSettings,
    /// Installing and using apps.
    Apps,
    /// Internet and Wi-Fi.
    Internet,
    /// Photos and the camera.
    Photos,
    /// Calls and contacts.
    Calls,
    /// Anything else.
    General,
}

impl Specialty {
    /// All specialties in display order.
    pub const ALL: [Self; 6] = [
        Self::PhoneSettings,
        Self::Apps,
        Self::Internet,
        Self::Photos,
        Self::Calls,
        Self::General,
    ];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PhoneSettings => "Phone Settings",
            Self::Apps => "Apps",
            Self::Internet => "Internet & Wi-Fi",
            Self::Photos => "Photos & Camera",
            Self::Calls => "Calls & Contacts",
            Self::General => "General Support",
        }
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A volunteer who can be matched and called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    /// Unique within the directory.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Number dialled when this volunteer is matched.
    pub phone_number: String,
    /// Optional profile picture location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// What the volunteer can help with.
    #[serde(default)]
    pub specialties: BTreeSet<Specialty>,
    /// Whether the volunteer can take a call right now.
    pub is_available: bool,
    /// Average rating in `[MIN_RATING, MAX_RATING]`.
    pub rating: f64,
    /// Number of completed help sessions.
    #[serde(default)]
    pub total_help_sessions: u32,
    /// When the volunteer signed up.
    pub joined_date: DateTime<Utc>,
}

impl Volunteer {
    /// Create an available volunteer with no rating history.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            profile_image_url: None,
            specialties: BTreeSet::new(),
            is_available: true,
            rating: MIN_RATING,
            total_help_sessions: 0,
            joined_date: Utc::now(),
        }
    }

    /// Set the specialties.
    #[must_use]
    pub fn with_specialties(mut self, specialties: impl IntoIterator<Item = Specialty>) -> Self {
        self.specialties = specialties.into_iter().collect();
        self
    }

    /// Set the rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Set availability.
    #[must_use]
    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }

    /// Bring the rating into `[MIN_RATING, MAX_RATING]`. Non-finite ratings
    /// become `MIN_RATING`.
    pub fn clamp_rating(&mut self) {
        self.rating = if self.rating.is_finite() {
            self.rating.clamp(MIN_RATING, MAX_RATING)
        } else {
            MIN_RATING
        };
    }

    /// Development records used to populate an empty directory.
    #[must_use]
    pub fn sample_volunteers() -> Vec<Self> {
        let now = Utc::now();
        vec![
            Self {
                total_help_sessions: 42,
                joined_date: now - Duration::days(200),
                ..Self::new("Alice Volunteer", "alice@example.com", "1234567890")
                    .with_specialties([Specialty::General])
                    .with_rating(4.8)
            },
            Self {
                total_help_sessions: 30,
                joined_date: now - Duration::days(300),
                ..Self::new("Bob Helper", "bob@example.com", "0987654321")
                    .with_specialties([Specialty::Apps, Specialty::Photos])
                    .with_rating(4.6)
                    .with_availability(false)
            },
        ]
    }
}
