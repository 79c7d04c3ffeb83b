//! Telephony provider boundary.
//!
//! A provider accepts start and end requests and reports what happened later,
//! as [`ProviderEvent`]s on a channel. It may also reset on its own at any
//! time.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::SessionId;
use crate::config::Config;
use crate::error::{Error, Result};

/// Capacity of the event channel handed out by [`SimulatedProvider::new`].
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Name the provider shows for outgoing calls unless told otherwise.
const DEFAULT_APP_NAME: &str = "SeniorConnect";

/// Asynchronous outcome reported by a telephony provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The outbound call started connecting.
    Connecting(SessionId),
    /// The outbound call connected.
    Connected(SessionId),
    /// The call ended, either on request or from the far side.
    Ended(SessionId),
    /// The call failed.
    Failed {
        /// Session that failed.
        session: SessionId,
        /// Provider-supplied reason.
        reason: String,
    },
    /// System-level teardown of every call.
    Reset,
}

impl ProviderEvent {
    /// Session the event refers to; `None` for [`ProviderEvent::Reset`].
    #[must_use]
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::Connecting(id) | Self::Connected(id) | Self::Ended(id) => Some(*id),
            Self::Failed { session, .. } => Some(*session),
            Self::Reset => None,
        }
    }
}

/// The native telephony integration.
///
/// Both requests return once the provider has accepted them; the result
/// arrives later as a [`ProviderEvent`].
#[async_trait]
pub trait TelephonyProvider: Send + Sync + std::fmt::Debug {
    /// Ask the provider to place a call to `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the provider refuses the request.
    async fn request_start_call(
        &self,
        session: SessionId,
        handle: &str,
        display_name: &str,
    ) -> Result<()>;

    /// Ask the provider to hang up `session`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the provider refuses the request.
    async fn request_end_call(&self, session: SessionId) -> Result<()>;
}

/// How a [`SimulatedProvider`] responds to requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SimulatedBehavior {
    /// Connect every call and confirm every hang-up.
    #[default]
    Connect,
    /// Refuse start requests outright.
    RejectStart(String),
    /// Report connecting, then fail.
    FailAfterConnecting(String),
    /// Accept requests and never report back.
    Silent,
}

/// An in-process provider that scripts provider callbacks.
#[derive(Debug)]
pub struct SimulatedProvider {
    events: mpsc::Sender<ProviderEvent>,
    behavior: SimulatedBehavior,
    step_delay: Duration,
    app_name: String,
}

impl SimulatedProvider {
    /// Create a provider and the receiving end of its event channel.
    #[must_use]
    pub fn new(behavior: SimulatedBehavior) -> (Self, mpsc::Receiver<ProviderEvent>) {
        let (events, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let provider = Self {
            events,
            behavior,
            step_delay: Duration::ZERO,
            app_name: DEFAULT_APP_NAME.to_string(),
        };
        (provider, rx)
    }

    /// Create a provider that presents calls under the configured app name.
    #[must_use]
    pub fn from_config(
        behavior: SimulatedBehavior,
        config: &Config,
    ) -> (Self, mpsc::Receiver<ProviderEvent>) {
        let (provider, rx) = Self::new(behavior);
        (provider.with_app_name(config.calls.app_name.clone()), rx)
    }

    /// Present outgoing calls under this name.
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Name outgoing calls are presented under.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Wait this long before each reported step.
    #[must_use]
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Simulate a system-level teardown.
    pub async fn reset(&self) {
        if self.events.send(ProviderEvent::Reset).await.is_err() {
            debug!("Provider event receiver dropped; reset not delivered");
        }
    }

    fn report(&self, steps: Vec<ProviderEvent>) {
        let tx = self.events.clone();
        let delay = self.step_delay;
        tokio::spawn(async move {
            for event in steps {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if tx.send(event).await.is_err() {
                    debug!("Provider event receiver dropped");
                    return;
                }
            }
        });
    }
}

#[async_trait]
impl TelephonyProvider for SimulatedProvider {
    async fn request_start_call(
        &self,
        session: SessionId,
        handle: &str,
        display_name: &str,
    ) -> Result<()> {
        debug!(
            "Simulated start of {} to {} ({}) via {}",
            session, handle, display_name, self.app_name
        );
        match &self.behavior {
            SimulatedBehavior::Connect => {
                self.report(vec![
                    ProviderEvent::Connecting(session),
                    ProviderEvent::Connected(session),
                ]);
            }
            SimulatedBehavior::RejectStart(reason) => return Err(Error::provider(reason.clone())),
            SimulatedBehavior::FailAfterConnecting(reason) => {
                self.report(vec![
                    ProviderEvent::Connecting(session),
                    ProviderEvent::Failed {
                        session,
                        reason: reason.clone(),
                    },
                ]);
            }
            SimulatedBehavior::Silent => {}
        }
        Ok(())
    }

    async fn request_end_call(&self, session: SessionId) -> Result<()> {
        debug!("Simulated end of {}", session);
        if self.behavior != SimulatedBehavior::Silent {
            self.report(vec![ProviderEvent::Ended(session)]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_session() {
        let id = SessionId::new();
        assert_eq!(ProviderEvent::Connected(id).session(), Some(id));
        assert_eq!(
            ProviderEvent::Failed {
                session: id,
                reason: "busy".to_string()
            }
            .session(),
            Some(id)
        );
        assert_eq!(ProviderEvent::Reset.session(), None);
    }

    #[test]
    fn test_app_name_defaults() {
        let (provider, _rx) = SimulatedProvider::new(SimulatedBehavior::Connect);
        assert_eq!(provider.app_name(), "SeniorConnect");
    }

    #[test]
    fn test_app_name_from_config() {
        let mut config = Config::default();
        config.calls.app_name = "Helping Hands".to_string();

        let (provider, _rx) = SimulatedProvider::from_config(SimulatedBehavior::Connect, &config);
        assert_eq!(provider.app_name(), "Helping Hands");

        let provider = provider.with_app_name("Neighbors");
        assert_eq!(provider.app_name(), "Neighbors");
    }

    #[tokio::test]
    async fn test_simulated_connect_reports_in_order() {
        let (provider, mut rx) = SimulatedProvider::new(SimulatedBehavior::Connect);
        let id = SessionId::new();

        provider.request_start_call(id, "555", "Ann").await.unwrap();
        assert_eq!(rx.recv().await, Some(ProviderEvent::Connecting(id)));
        assert_eq!(rx.recv().await, Some(ProviderEvent::Connected(id)));

        provider.request_end_call(id).await.unwrap();
        assert_eq!(rx.recv().await, Some(ProviderEvent::Ended(id)));
    }

    #[tokio::test]
    async fn test_simulated_reject() {
        let (provider, _rx) =
            SimulatedProvider::new(SimulatedBehavior::RejectStart("no signal".to_string()));
        let err = provider
            .request_start_call(SessionId::new(), "555", "Ann")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(ref r) if r == "no signal"));
    }

    #[tokio::test]
    async fn test_simulated_fail_after_connecting() {
        let (provider, mut rx) =
            SimulatedProvider::new(SimulatedBehavior::FailAfterConnecting("dropped".to_string()));
        let id = SessionId::new();

        provider.request_start_call(id, "555", "Ann").await.unwrap();
        assert_eq!(rx.recv().await, Some(ProviderEvent::Connecting(id)));
        assert_eq!(
            rx.recv().await,
            Some(ProviderEvent::Failed {
                session: id,
                reason: "dropped".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_simulated_silent_reports_nothing() {
        let (provider, mut rx) = SimulatedProvider::new(SimulatedBehavior::Silent);
        let id = SessionId::new();

        provider.request_start_call(id, "555", "Ann").await.unwrap();
        provider.request_end_call(id).await.unwrap();
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_simulated_reset() {
        let (provider, mut rx) = SimulatedProvider::new(SimulatedBehavior::Connect);
        provider.reset().await;
        assert_eq!(rx.recv().await, Some(ProviderEvent::Reset));
    }

    #[tokio::test]
    async fn test_step_delay() {
        let (provider, mut rx) = SimulatedProvider::new(SimulatedBehavior::Connect);
        let provider = provider.with_step_delay(Duration::from_millis(5));
        let id = SessionId::new();

        let started = tokio::time::Instant::now();
        provider.request_start_call(id, "555", "Ann").await.unwrap();
        assert_eq!(rx.recv().await, Some(ProviderEvent::Connecting(id)));
        assert_eq!(rx.recv().await, Some(ProviderEvent::Connected(id)));
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
