//! Picking a volunteer to call.
//!
//! Matching is a pure query over a snapshot of the directory: it never
//! mutates anything and never involves randomness.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::VolunteerDirectory;
use crate::models::Volunteer;

/// Which lookup chooses the volunteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Highest-rated available volunteer; earliest in the list on ties.
    #[default]
    BestRated,
    /// First available volunteer in list order.
    FirstAvailable,
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BestRated => write!(f, "best_rated"),
            Self::FirstAvailable => write!(f, "first_available"),
        }
    }
}

impl MatchStrategy {
    /// Run this strategy against the directory.
    #[must_use]
    pub fn select<'a>(self, directory: &'a VolunteerDirectory) -> Option<&'a Volunteer> {
        match self {
            Self::BestRated => select_volunteer(directory),
            Self::FirstAvailable => first_available(directory),
        }
    }
}

/// The highest-rated available volunteer.
///
/// Ties go to whoever appears first in [`VolunteerDirectory::list`].
#[must_use]
pub fn select_volunteer(directory: &VolunteerDirectory) -> Option<&Volunteer> {
    best_rated(directory.list())
}

/// The first available volunteer in list order, ignoring rating.
#[must_use]
pub fn first_available(directory: &VolunteerDirectory) -> Option<&Volunteer> {
    directory.list().iter().find(|v| v.is_available)
}

/// Number of volunteers who can take a call right now.
#[must_use]
pub fn available_count(directory: &VolunteerDirectory) -> usize {
    directory.list().iter().filter(|v| v.is_available).count()
}

/// Stable descending sort by rating over the available volunteers, then take
/// the head. Only a strictly higher rating displaces the current best, which
/// is what keeps the earliest entry on ties.
fn best_rated(volunteers: &[Volunteer]) -> Option<&Volunteer> {
    volunteers
        .iter()
        .filter(|v| v.is_available)
        .fold(None, |best: Option<&Volunteer>, candidate| match best {
            Some(current) if candidate.rating.total_cmp(&current.rating).is_le() => Some(current),
            _ => Some(candidate),
        })
}

/// A snapshot of who to call, taken at match time.
///
/// Later edits to the volunteer record do not affect a target that has
/// already been taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    /// The matched volunteer.
    pub volunteer_id: Uuid,
    /// Number to dial.
    pub phone_number: String,
    /// Name shown while the call is in progress.
    pub display_name: String,
}

impl From<&Volunteer> for CallTarget {
    fn from(volunteer: &Volunteer) -> Self {
        Self {
            volunteer_id: volunteer.id,
            phone_number: volunteer.phone_number.clone(),
            display_name: volunteer.name.clone(),
        }
    }
}
