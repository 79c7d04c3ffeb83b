//! Domain records for seniorconnect.
//!
//! These are the types that are persisted to the key-value store and handed
//! to the presentation layer. Field tags are camelCase so that records keep
//! the same shape across releases; new fields must carry a default.

pub mod help_request;
pub mod user;
pub mod volunteer;

pub use help_request::{HelpCategory, HelpRequest, RequestStatus, RequestType, UrgencyLevel};
pub use user::{User, UserType};
pub use volunteer::{Specialty, Volunteer, MAX_RATING, MIN_RATING};
