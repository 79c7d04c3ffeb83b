//! `seniorconnect` - Connects senior citizens who need tech help with volunteers
//!
//! This library provides the volunteer directory, the matching policy that
//! picks who to call, the call-session state machine, and the on-device user
//! record. Presentation layers observe state changes through [`EventBus`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod call;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod logging;
pub mod matching;
pub mod models;
pub mod notify;
pub mod storage;
pub mod user_store;

pub use call::{CallManager, CallSession, CallState, SessionId, TelephonyProvider};
pub use config::Config;
pub use directory::VolunteerDirectory;
pub use error::{Error, Result};
pub use events::{Event, EventBus};
pub use logging::init_logging;
pub use matching::{select_volunteer, CallTarget, MatchStrategy};
pub use models::{HelpRequest, User, UserType, Volunteer};
pub use notify::{LogNotifier, Notifier};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageStats};
pub use user_store::UserStore;
