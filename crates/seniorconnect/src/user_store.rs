//! The registered user and the logged-in flag.
//!
//! The user record is persisted under [`USER_KEY`]; the logged-in flag is
//! session state only and always starts out `false`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::{Event, EventBus};
use crate::models::{User, UserType};
use crate::storage::{delete_record, load_record, save_record, KeyValueStore, USER_KEY};

/// Owns the single on-device user.
#[derive(Debug)]
pub struct UserStore {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    current: Option<User>,
    logged_in: bool,
}

impl UserStore {
    /// Load the persisted user, if any. Never fails: an unreadable record
    /// leaves the store empty.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        let current: Option<User> = load_record(store.as_ref(), USER_KEY);
        if let Some(user) = &current {
            debug!("Loaded user {}", user.id);
        }
        Self {
            store,
            events,
            current,
            logged_in: false,
        }
    }

    /// The stored user, logged in or not.
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Whether the user has logged in during this session.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Register a new user, replacing any stored one, and log them in.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` or `phone` is blank.
    pub fn register(&mut self, name: &str, phone: &str, user_type: UserType) -> Result<User> {
        let user = User::new(name.trim(), phone.trim(), user_type);
        user.validate()?;

        info!("Registered {} user {}", user_type, user.id);
        self.current = Some(user.clone());
        self.persist();
        self.events.publish(Event::UserChanged(self.current.clone()));
        self.set_logged_in(true);
        Ok(user)
    }

    /// Log in when `phone` matches the stored user's number.
    pub fn login(&mut self, phone: &str) -> bool {
        let matches = self
            .current
            .as_ref()
            .is_some_and(|user| user.phone_matches(phone));

        if matches {
            self.set_logged_in(true);
        } else {
            debug!("Login rejected");
        }
        matches
    }

    /// Apply `mutator` to the stored user and persist the result.
    ///
    /// Returns `Ok(false)` without calling `mutator` when no user is stored.
    /// The id cannot be changed; any change to it is undone.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the mutated record has a blank name or
    /// phone number. The stored user is left unchanged in that case.
    pub fn update<F>(&mut self, mutator: F) -> Result<bool>
    where
        F: FnOnce(&mut User),
    {
        let Some(current) = &self.current else {
            debug!("No user to update");
            return Ok(false);
        };

        let mut updated = current.clone();
        mutator(&mut updated);
        if updated.id != current.id {
            warn!("Ignoring attempt to change user id");
            updated.id = current.id;
        }
        updated.validate()?;

        self.current = Some(updated);
        self.persist();
        self.events.publish(Event::UserChanged(self.current.clone()));
        Ok(true)
    }

    /// Log out. The stored user is kept.
    pub fn logout(&mut self) {
        self.set_logged_in(false);
    }

    /// Forget the user entirely, in memory and on disk.
    pub fn clear(&mut self) {
        info!("Clearing stored user");
        self.current = None;
        delete_record(self.store.as_ref(), USER_KEY);
        self.events.publish(Event::UserChanged(None));
        self.set_logged_in(false);
    }

    fn set_logged_in(&mut self, logged_in: bool) {
        if self.logged_in != logged_in {
            self.logged_in = logged_in;
            self.events.publish(Event::LoginChanged(logged_in));
        }
    }

    fn persist(&self) {
        match &self.current {
            Some(user) => save_record(self.store.as_ref(), USER_KEY, user),
            None => delete_record(self.store.as_ref(), USER_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::events::drain;
    use crate::storage::test_support::FailingStore;
    use crate::storage::MemoryStore;

    fn new_store() -> (Arc<dyn KeyValueStore>, UserStore) {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let users = UserStore::load(Arc::clone(&kv), EventBus::new());
        (kv, users)
    }

    #[test]
    fn test_empty_store() {
        let (_, users) = new_store();
        assert!(users.current_user().is_none());
        assert!(!users.is_logged_in());
    }

    #[test]
    fn test_register_logs_in_and_persists() {
        let (kv, mut users) = new_store();
        let user = users
            .register(" Margaret ", "5551234567", UserType::Senior)
            .unwrap();

        assert_eq!(user.name, "Margaret");
        assert!(users.is_logged_in());
        assert_eq!(users.current_user(), Some(&user));
        assert!(kv.get(USER_KEY).unwrap().is_some());
    }

    #[test]
    fn test_register_rejects_blank_fields() {
        let (kv, mut users) = new_store();

        let err = users.register("", "555", UserType::Senior).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        let err = users.register("Ann", "   ", UserType::Senior).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        assert!(users.current_user().is_none());
        assert!(kv.get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_reload_keeps_record_but_not_login() {
        let (kv, mut users) = new_store();
        let user = users.register("Ann", "555", UserType::Volunteer).unwrap();
        users
            .update(|u| u.profile_image_url = Some("file:///ann.png".to_string()))
            .unwrap();
        let expected = users.current_user().cloned();

        let reloaded = UserStore::load(kv, EventBus::new());
        assert_eq!(reloaded.current_user().cloned(), expected);
        assert_eq!(reloaded.current_user().map(|u| u.id), Some(user.id));
        assert!(!reloaded.is_logged_in());
    }

    #[test]
    fn test_login() {
        let (kv, mut users) = new_store();
        users.register("Ann", "5551234567", UserType::Senior).unwrap();

        let mut reloaded = UserStore::load(kv, EventBus::new());
        assert!(!reloaded.login("5550000000"));
        assert!(!reloaded.is_logged_in());
        assert!(reloaded.login("  5551234567\n"));
        assert!(reloaded.is_logged_in());
    }

    #[test]
    fn test_login_without_user() {
        let (_, mut users) = new_store();
        assert!(!users.login("555"));
    }

    #[test]
    fn test_update_without_user_is_noop() {
        let (kv, mut users) = new_store();
        let mut called = false;
        assert!(!users.update(|_| called = true).unwrap());
        assert!(!called);
        assert!(kv.get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_update_rejects_invalid_result() {
        let (_, mut users) = new_store();
        users.register("Ann", "555", UserType::Senior).unwrap();

        let err = users.update(|u| u.name = String::new()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(users.current_user().map(|u| u.name.as_str()), Some("Ann"));
    }

    #[test]
    fn test_update_cannot_change_id() {
        let (_, mut users) = new_store();
        let user = users.register("Ann", "555", UserType::Senior).unwrap();
        users.update(|u| u.id = uuid::Uuid::new_v4()).unwrap();
        assert_eq!(users.current_user().map(|u| u.id), Some(user.id));
    }

    #[test]
    fn test_logout_keeps_record() {
        let (kv, mut users) = new_store();
        users.register("Ann", "555", UserType::Senior).unwrap();
        users.logout();

        assert!(!users.is_logged_in());
        assert!(users.current_user().is_some());
        assert!(kv.get(USER_KEY).unwrap().is_some());
    }

    #[test]
    fn test_clear_removes_record() {
        let (kv, mut users) = new_store();
        users.register("Ann", "555", UserType::Senior).unwrap();
        users.clear();

        assert!(users.current_user().is_none());
        assert!(!users.is_logged_in());
        assert!(kv.get(USER_KEY).unwrap().is_none());
        assert!(UserStore::load(kv, EventBus::new()).current_user().is_none());
    }

    #[test]
    fn test_corrupt_record_loads_empty() {
        crate::logging::init_test_logging();
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        kv.set(USER_KEY, b"\x00\x01garbage").unwrap();

        let users = UserStore::load(kv, EventBus::new());
        assert!(users.current_user().is_none());
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        crate::logging::init_test_logging();
        let kv: Arc<dyn KeyValueStore> = Arc::new(FailingStore::default());
        let mut users = UserStore::load(kv, EventBus::new());

        let user = users.register("Ann", "555", UserType::Senior).unwrap();
        assert_eq!(users.current_user(), Some(&user));
    }

    #[test]
    fn test_events_published() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let mut users = UserStore::load(kv, bus);

        let user = users.register("Ann", "555", UserType::Senior).unwrap();
        users.logout();

        assert_eq!(
            drain(&mut rx),
            vec![
                Event::UserChanged(Some(user)),
                Event::LoginChanged(true),
                Event::LoginChanged(false),
            ]
        );
    }
}
