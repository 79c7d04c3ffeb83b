//! The volunteer directory.
//!
//! Volunteers are kept in insertion order. Every mutation rewrites the whole
//! collection under [`VOLUNTEERS_KEY`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::events::{Event, EventBus};
use crate::models::Volunteer;
use crate::storage::{load_record, save_record, KeyValueStore, VOLUNTEERS_KEY};

/// Owns the list of volunteers and its persistence binding.
#[derive(Debug)]
pub struct VolunteerDirectory {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    volunteers: Vec<Volunteer>,
}

impl VolunteerDirectory {
    /// Load the persisted collection. A missing or corrupt record yields an
    /// empty directory.
    ///
    /// Ratings are clamped and only the first volunteer with a given id is
    /// kept.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        let stored: Vec<Volunteer> =
            load_record(store.as_ref(), VOLUNTEERS_KEY).unwrap_or_default();

        let mut seen = HashSet::with_capacity(stored.len());
        let mut volunteers = Vec::with_capacity(stored.len());
        for mut volunteer in stored {
            if !seen.insert(volunteer.id) {
                warn!("Dropping stored volunteer with duplicate id {}", volunteer.id);
                continue;
            }
            let rating = volunteer.rating;
            volunteer.clamp_rating();
            if volunteer.rating.to_bits() != rating.to_bits() {
                warn!(
                    "Clamped stored rating {} to {} for volunteer {}",
                    rating, volunteer.rating, volunteer.id
                );
            }
            volunteers.push(volunteer);
        }
        debug!("Loaded {} volunteers", volunteers.len());
        Self {
            store,
            events,
            volunteers,
        }
    }

    /// Snapshot of all volunteers in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Volunteer] {
        &self.volunteers
    }

    /// Look up a volunteer by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Volunteer> {
        self.volunteers.iter().find(|v| v.id == id)
    }

    /// Number of volunteers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.volunteers.len()
    }

    /// Whether the directory has no volunteers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volunteers.is_empty()
    }

    /// Append a volunteer. The rating is clamped into range first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if a volunteer with the same id exists.
    pub fn add(&mut self, mut volunteer: Volunteer) -> Result<()> {
        if self.get(volunteer.id).is_some() {
            return Err(Error::DuplicateId {
                id: volunteer.id.to_string(),
            });
        }

        volunteer.clamp_rating();
        info!("Adding volunteer {} ({})", volunteer.id, volunteer.name);
        self.volunteers.push(volunteer);
        self.commit();
        Ok(())
    }

    /// Apply `mutator` to the volunteer with `id` and persist.
    ///
    /// The id is immutable and the rating is clamped after the mutator runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no volunteer has `id`.
    pub fn update<F>(&mut self, id: Uuid, mutator: F) -> Result<&Volunteer>
    where
        F: FnOnce(&mut Volunteer),
    {
        let idx = self
            .volunteers
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| Error::not_found("volunteer", id))?;

        let mut updated = self.volunteers[idx].clone();
        mutator(&mut updated);
        if updated.id != id {
            warn!("Ignoring attempt to change volunteer id {}", id);
            updated.id = id;
        }
        updated.clamp_rating();

        self.volunteers[idx] = updated;
        self.commit();
        Ok(&self.volunteers[idx])
    }

    /// Remove the volunteer with `id`. Returns whether one was removed;
    /// removing an unknown id is not an error.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.volunteers.len();
        self.volunteers.retain(|v| v.id != id);
        let removed = self.volunteers.len() != before;

        if removed {
            info!("Removed volunteer {}", id);
            self.commit();
        } else {
            debug!("No volunteer {} to remove", id);
        }
        removed
    }

    /// Populate an empty directory with the sample volunteers. Returns how
    /// many were added.
    pub fn seed_samples(&mut self) -> usize {
        if !self.volunteers.is_empty() {
            debug!("Directory not empty; skipping sample seed");
            return 0;
        }
        self.volunteers = Volunteer::sample_volunteers();
        info!("Seeded {} sample volunteers", self.volunteers.len());
        self.commit();
        self.volunteers.len()
    }

    fn commit(&self) {
        save_record(self.store.as_ref(), VOLUNTEERS_KEY, &self.volunteers);
        self.events.publish(Event::VolunteersChanged {
            count: self.volunteers.len(),
        });
    }
}
