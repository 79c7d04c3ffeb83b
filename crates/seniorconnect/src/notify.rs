//! Help-request dispatch.
//!
//! A senior who prefers not to call can leave a written request instead. The
//! request is announced on the [`EventBus`] and handed to a [`Notifier`],
//! which is where a push-notification or SMS integration would plug in.

use tracing::info;

use crate::error::{Error, Result};
use crate::events::{Event, EventBus};
use crate::models::{HelpRequest, RequestType};
use crate::user_store::UserStore;

/// Delivers help-request alerts to volunteers.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Alert volunteers that `request` needs attention.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert could not be delivered.
    fn send_volunteer_alert(&self, request: &HelpRequest) -> Result<()>;
}

/// A notifier that writes alerts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_volunteer_alert(&self, request: &HelpRequest) -> Result<()> {
        info!(
            urgency = ?request.urgency(),
            "A senior citizen needs help with: {}",
            request.title
        );
        Ok(())
    }
}

/// Submit a help request on behalf of the logged-in user.
///
/// # Errors
///
/// - A validation error if nobody is logged in or `title` is blank.
/// - Whatever the notifier returns; the request has already been announced
///   on the bus by then.
pub fn submit_help_request(
    users: &UserStore,
    events: &EventBus,
    notifier: &dyn Notifier,
    title: &str,
    description: &str,
    request_type: RequestType,
) -> Result<HelpRequest> {
    let user = match users.current_user() {
        Some(user) if users.is_logged_in() => user,
        _ => return Err(Error::validation("log in before requesting help")),
    };
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("a help request needs a title"));
    }

    let request = HelpRequest::new(user.id, title, description.trim(), request_type);
    info!("Help request {} ({}) from {}", request.id, request_type.label(), user.id);
    events.publish(Event::HelpRequested(request.clone()));
    notifier.send_volunteer_alert(&request)?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::events::drain;
    use crate::models::{RequestStatus, UserType};
    use crate::storage::MemoryStore;

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn send_volunteer_alert(&self, request: &HelpRequest) -> Result<()> {
            self.sent
                .lock()
                .map_err(|_| Error::internal("poisoned"))?
                .push(request.title.clone());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct UnreachableNotifier;

    impl Notifier for UnreachableNotifier {
        fn send_volunteer_alert(&self, _request: &HelpRequest) -> Result<()> {
            Err(Error::provider("push service unreachable"))
        }
    }

    fn users(bus: &EventBus) -> UserStore {
        UserStore::load(Arc::new(MemoryStore::new()), bus.clone())
    }

    #[test]
    fn test_submit_requires_login() {
        let bus = EventBus::new();
        let mut users = users(&bus);
        let notifier = RecordingNotifier::default();

        let err = submit_help_request(&users, &bus, &notifier, "Wi-Fi", "", RequestType::GeneralHelp)
            .unwrap_err();
        assert!(err.is_user_correctable());

        users.register("Ann", "555", UserType::Senior).unwrap();
        users.logout();
        assert!(
            submit_help_request(&users, &bus, &notifier, "Wi-Fi", "", RequestType::GeneralHelp)
                .is_err()
        );
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_submit_publishes_and_notifies() {
        let bus = EventBus::new();
        let mut users = users(&bus);
        let user = users.register("Ann", "555", UserType::Senior).unwrap();
        let mut rx = bus.subscribe();
        let notifier = RecordingNotifier::default();

        let request = submit_help_request(
            &users,
            &bus,
            &notifier,
            "  Photos won't sync ",
            "Since yesterday",
            RequestType::AppSupport,
        )
        .unwrap();

        assert_eq!(request.user_id, user.id);
        assert_eq!(request.title, "Photos won't sync");
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(drain(&mut rx), vec![Event::HelpRequested(request)]);
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["Photos won't sync"]);
    }

    #[test]
    fn test_submit_rejects_blank_title() {
        let bus = EventBus::new();
        let mut users = users(&bus);
        users.register("Ann", "555", UserType::Senior).unwrap();

        let err = submit_help_request(&users, &bus, &LogNotifier, "  ", "x", RequestType::Emergency)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_notifier_failure_is_returned() {
        let bus = EventBus::new();
        let mut users = users(&bus);
        users.register("Ann", "555", UserType::Senior).unwrap();

        let err = submit_help_request(
            &users,
            &bus,
            &UnreachableNotifier,
            "Help",
            "",
            RequestType::Emergency,
        )
        .unwrap_err();
        assert!(err.is_provider_error());
    }

    #[test]
    fn test_log_notifier() {
        crate::logging::init_test_logging();
        let request = HelpRequest::new(uuid::Uuid::new_v4(), "Calls", "", RequestType::Emergency);
        assert!(LogNotifier.send_volunteer_alert(&request).is_ok());
    }
}
