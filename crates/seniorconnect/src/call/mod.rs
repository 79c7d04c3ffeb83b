//! Outbound calls to volunteers.
//!
//! - `session`: session identity and lifecycle states
//! - `provider`: the telephony boundary and an in-process simulation
//! - `manager`: the state machine that ties them together

mod manager;
mod provider;
mod session;

pub use manager::CallManager;
pub use provider::{ProviderEvent, SimulatedBehavior, SimulatedProvider, TelephonyProvider};
pub use session::{CallSession, CallState, SessionId};
