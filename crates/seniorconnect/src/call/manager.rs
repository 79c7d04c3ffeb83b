//! The call-session state machine.
//!
//! [`CallManager`] tracks at most one session. Requests go out through the
//! [`TelephonyProvider`]; the provider's answers come back as
//! [`ProviderEvent`]s that the owner feeds in with
//! [`CallManager::handle_event`] or [`CallManager::next_transition`]. Every
//! failure path ends with the manager back at [`CallState::Idle`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::provider::{ProviderEvent, TelephonyProvider};
use super::session::{CallSession, CallState, SessionId};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{Event, EventBus};
use crate::matching::CallTarget;

/// Owns the current call session and drives it through its lifecycle.
#[derive(Debug)]
pub struct CallManager {
    provider: Arc<dyn TelephonyProvider>,
    events: EventBus,
    start_timeout: Duration,
    end_timeout: Duration,
    current: Option<CallSession>,
}

impl CallManager {
    /// Create a manager with the default timeouts.
    #[must_use]
    pub fn new(provider: Arc<dyn TelephonyProvider>, events: EventBus) -> Self {
        Self::from_config(provider, events, &Config::default())
    }

    /// Create a manager using the timeouts from `config`.
    #[must_use]
    pub fn from_config(
        provider: Arc<dyn TelephonyProvider>,
        events: EventBus,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            events,
            start_timeout: config.start_timeout(),
            end_timeout: config.end_timeout(),
            current: None,
        }
    }

    /// Override the start and end timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, start_timeout: Duration, end_timeout: Duration) -> Self {
        self.start_timeout = start_timeout;
        self.end_timeout = end_timeout;
        self
    }

    /// State of the current session, or `Idle` when there is none.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.current.as_ref().map_or(CallState::Idle, |s| s.state)
    }

    /// The session being tracked, if any.
    #[must_use]
    pub fn current_session(&self) -> Option<&CallSession> {
        self.current.as_ref()
    }

    /// Whether a call is connected.
    #[must_use]
    pub fn is_call_active(&self) -> bool {
        self.state() == CallState::Active
    }

    /// Start a call to a matched volunteer.
    ///
    /// # Errors
    ///
    /// See [`CallManager::start_call`].
    pub async fn call(&mut self, target: &CallTarget) -> Result<SessionId> {
        self.start_call(&target.phone_number, &target.display_name)
            .await
    }

    /// Request an outbound call and move to `Starting`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTarget`] if `phone_number` is blank; nothing changes.
    /// - [`Error::SessionBusy`] if a session is already current; the current
    ///   session is untouched.
    /// - The provider's error if it refuses the request; the session goes to
    ///   `Failed` and is cleared.
    pub async fn start_call(&mut self, phone_number: &str, display_name: &str) -> Result<SessionId> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(Error::InvalidTarget);
        }
        if let Some(current) = &self.current {
            warn!("Rejecting call while session {} is {}", current.id, current.state);
            return Err(Error::SessionBusy {
                session: current.id,
            });
        }

        let session = CallSession::new(phone_number, display_name);
        let id = session.id;
        self.current = Some(session);
        self.transition(CallState::Starting);
        self.set_deadline(Some(Instant::now() + self.start_timeout));

        info!("Starting call {} to {}", id, display_name);
        if let Err(e) = self
            .provider
            .request_start_call(id, phone_number, display_name)
            .await
        {
            self.fail(&e.to_string());
            return Err(e);
        }
        Ok(id)
    }

    /// Request that the current call be hung up and move to `Ending`.
    ///
    /// With no current session this logs and returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if it refuses the request; the session
    /// goes to `Failed` and is cleared.
    pub async fn end_call(&mut self) -> Result<()> {
        let Some(session) = &self.current else {
            warn!("No active call to end");
            return Ok(());
        };
        let id = session.id;
        if session.state == CallState::Ending {
            debug!("Call {} is already ending", id);
            return Ok(());
        }

        self.transition(CallState::Ending);
        self.set_deadline(Some(Instant::now() + self.end_timeout));

        info!("Ending call {}", id);
        if let Err(e) = self.provider.request_end_call(id).await {
            self.fail(&e.to_string());
            return Err(e);
        }
        Ok(())
    }

    /// Apply a provider callback. Returns the state afterwards.
    ///
    /// Callbacks for any session other than the current one are ignored.
    pub fn handle_event(&mut self, event: ProviderEvent) -> CallState {
        let Some(event_session) = event.session() else {
            self.reset();
            return self.state();
        };

        let Some(current) = &self.current else {
            debug!("Ignoring {:?} with no current session", event);
            return CallState::Idle;
        };
        if current.id != event_session {
            debug!("Ignoring {:?} for stale session", event);
            return current.state;
        }
        let state = current.state;

        match (state, event) {
            (CallState::Starting, ProviderEvent::Connecting(_)) => {
                self.transition(CallState::Connecting);
            }
            (CallState::Starting | CallState::Connecting, ProviderEvent::Connected(_)) => {
                if state == CallState::Starting {
                    self.transition(CallState::Connecting);
                }
                self.transition(CallState::Active);
                self.set_deadline(None);
                info!("Call {} connected", event_session);
            }
            (
                CallState::Starting | CallState::Connecting | CallState::Active | CallState::Ending,
                ProviderEvent::Ended(_),
            ) => self.finish(),
            (_, ProviderEvent::Failed { reason, .. }) => self.fail(&reason),
            (state, event) => warn!("Unexpected {:?} while {}", event, state),
        }
        self.state()
    }

    /// Fail the current session if its pending step is overdue at `now`.
    /// Returns whether it did.
    pub fn expire_overdue(&mut self, now: Instant) -> bool {
        let Some(session) = &self.current else {
            return false;
        };
        match session.deadline {
            Some(deadline) if deadline <= now => {
                let operation = if session.state == CallState::Ending {
                    "end call"
                } else {
                    "start call"
                };
                let err = Error::Timeout {
                    operation: operation.to_string(),
                };
                self.fail(&err.to_string());
                true
            }
            _ => false,
        }
    }

    /// Wait for the next provider event or the pending deadline, whichever
    /// comes first, and apply it. Returns the resulting state, or `None` if
    /// the event channel closed.
    pub async fn next_transition(
        &mut self,
        events: &mut mpsc::Receiver<ProviderEvent>,
    ) -> Option<CallState> {
        let deadline = self.current.as_ref().and_then(CallSession::deadline);
        let event = match deadline {
            Some(deadline) => {
                if let Ok(event) = tokio::time::timeout_at(deadline, events.recv()).await {
                    event
                } else {
                    self.expire_overdue(Instant::now());
                    return Some(self.state());
                }
            }
            None => events.recv().await,
        };
        event.map(|event| self.handle_event(event))
    }

    /// Keep applying provider events until `done` holds for the state, the
    /// manager returns to `Idle`, or the channel closes. Returns the last
    /// state seen.
    pub async fn drive_until<F>(
        &mut self,
        events: &mut mpsc::Receiver<ProviderEvent>,
        done: F,
    ) -> CallState
    where
        F: Fn(CallState) -> bool,
    {
        loop {
            let state = self.state();
            if done(state) || state == CallState::Idle {
                return state;
            }
            if self.next_transition(events).await.is_none() {
                return self.state();
            }
        }
    }

    fn transition(&mut self, next: CallState) {
        let Some(session) = self.current.as_mut() else {
            return;
        };
        if !session.state.can_transition_to(next) {
            warn!("Refusing transition {} -> {}", session.state, next);
            return;
        }
        debug!("Call {}: {} -> {}", session.id, session.state, next);
        session.state = next;
        self.events.publish(Event::CallStateChanged {
            session: session.id,
            state: next,
        });
    }

    fn set_deadline(&mut self, deadline: Option<Instant>) {
        if let Some(session) = self.current.as_mut() {
            session.deadline = deadline;
        }
    }

    fn finish(&mut self) {
        self.transition(CallState::Ended);
        self.clear();
    }

    fn fail(&mut self, reason: &str) {
        if let Some(session) = &self.current {
            error!("Call {} failed: {}", session.id, reason);
        }
        self.transition(CallState::Failed);
        self.clear();
    }

    fn reset(&mut self) {
        match &self.current {
            Some(session) => warn!("Provider reset; discarding call {}", session.id),
            None => debug!("Provider reset with no current call"),
        }
        self.clear();
    }

    fn clear(&mut self) {
        if let Some(session) = self.current.take() {
            self.events.publish(Event::CallStateChanged {
                session: session.id,
                state: CallState::Idle,
            });
        }
    }
}
