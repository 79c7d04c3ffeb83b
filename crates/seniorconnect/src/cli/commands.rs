//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::call::SimulatedBehavior;
use crate::matching::MatchStrategy;
use crate::models::{RequestType, Specialty, UserType};

/// User account commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register the user of this device, replacing any existing one
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Phone number, also used to log in
        #[arg(short, long)]
        phone: String,

        /// Account type
        #[arg(short = 't', long = "type", value_enum, default_value = "senior")]
        user_type: UserTypeArg,
    },

    /// Check a phone number against the registered user
    Login {
        /// Phone number to check
        #[arg(short, long)]
        phone: String,
    },

    /// Log out the registered user
    Logout,

    /// Show the registered user
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change details of the registered user
    Edit {
        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Preferred way to be contacted
        #[arg(long)]
        contact_method: Option<String>,
    },

    /// Delete the registered user from this device
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Volunteer directory commands.
#[derive(Debug, Subcommand)]
pub enum VolunteerCommand {
    /// Add a volunteer
    Add {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Phone number to call
        #[arg(short, long)]
        phone: String,

        /// Areas the volunteer can help with (repeatable)
        #[arg(short, long = "specialty", value_enum)]
        specialties: Vec<SpecialtyArg>,

        /// Starting rating, 0 to 5
        #[arg(short, long, default_value = "0")]
        rating: f64,

        /// Add as not currently available
        #[arg(long)]
        unavailable: bool,
    },

    /// List volunteers in directory order
    List {
        /// Only show volunteers who can take a call now
        #[arg(short, long)]
        available: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Mark a volunteer available or unavailable
    Available {
        /// Volunteer id
        id: Uuid,

        /// Mark as unavailable instead
        #[arg(long)]
        off: bool,
    },

    /// Set a volunteer's rating
    Rate {
        /// Volunteer id
        id: Uuid,

        /// New rating, clamped to 0 to 5
        rating: f64,
    },

    /// Remove a volunteer
    Remove {
        /// Volunteer id
        id: Uuid,
    },

    /// Add the sample volunteers to an empty directory
    Seed,
}

/// Match command arguments.
#[derive(Debug, Args)]
pub struct MatchCommand {
    /// Override the configured matching strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,
}

/// Call command arguments.
#[derive(Debug, Args)]
pub struct CallCommand {
    /// Call this volunteer instead of matching one
    #[arg(long)]
    pub volunteer: Option<Uuid>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// How long to stay connected before hanging up, in milliseconds
    #[arg(long, default_value = "1000")]
    pub hold_ms: u64,

    /// How the simulated telephony provider behaves
    #[arg(long, value_enum, default_value = "connect")]
    pub simulate: SimulateArg,
}

/// Help request command arguments.
#[derive(Debug, Args)]
pub struct RequestCommand {
    /// Phone number of the registered user, used to log in
    #[arg(short, long)]
    pub phone: String,

    /// Short summary of the problem
    #[arg(short, long)]
    pub title: String,

    /// Longer description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Kind of help needed
    #[arg(long = "type", value_enum, default_value = "general-help")]
    pub request_type: RequestTypeArg,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Account type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UserTypeArg {
    /// Someone asking for help
    Senior,
    /// Someone offering help
    Volunteer,
}

impl From<UserTypeArg> for UserType {
    fn from(arg: UserTypeArg) -> Self {
        match arg {
            UserTypeArg::Senior => Self::Senior,
            UserTypeArg::Volunteer => Self::Volunteer,
        }
    }
}

/// Volunteer specialty argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpecialtyArg {
    /// Phone settings
    PhoneSettings,
    /// Apps
    Apps,
    /// Internet and Wi-Fi
    Internet,
    /// Photos and camera
    Photos,
    /// Calls and contacts
    Calls,
    /// General support
    General,
}

impl From<SpecialtyArg> for Specialty {
    fn from(arg: SpecialtyArg) -> Self {
        match arg {
            SpecialtyArg::PhoneSettings => Self::PhoneSettings,
            SpecialtyArg::Apps => Self::Apps,
            SpecialtyArg::Internet => Self::Internet,
            SpecialtyArg::Photos => Self::Photos,
            SpecialtyArg::Calls => Self::Calls,
            SpecialtyArg::General => Self::General,
        }
    }
}

/// Help request type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RequestTypeArg {
    /// General help
    GeneralHelp,
    /// Trouble with an app
    AppSupport,
    /// Setting up a device
    DeviceSetup,
    /// Something stopped working
    Troubleshooting,
    /// Needs someone now
    Emergency,
}

impl From<RequestTypeArg> for RequestType {
    fn from(arg: RequestTypeArg) -> Self {
        match arg {
            RequestTypeArg::GeneralHelp => Self::GeneralHelp,
            RequestTypeArg::AppSupport => Self::AppSupport,
            RequestTypeArg::DeviceSetup => Self::DeviceSetup,
            RequestTypeArg::Troubleshooting => Self::Troubleshooting,
            RequestTypeArg::Emergency => Self::Emergency,
        }
    }
}

/// Matching strategy argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Highest-rated available volunteer
    BestRated,
    /// First available volunteer in directory order
    FirstAvailable,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::BestRated => Self::BestRated,
            StrategyArg::FirstAvailable => Self::FirstAvailable,
        }
    }
}

/// Simulated provider behavior argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SimulateArg {
    /// Connect and hang up normally
    #[default]
    Connect,
    /// Refuse to place the call
    Reject,
    /// Drop the call while connecting
    Fail,
    /// Never answer, so the call times out
    Silent,
}

impl From<SimulateArg> for SimulatedBehavior {
    fn from(arg: SimulateArg) -> Self {
        match arg {
            SimulateArg::Connect => Self::Connect,
            SimulateArg::Reject => Self::RejectStart("simulated rejection".to_string()),
            SimulateArg::Fail => Self::FailAfterConnecting("simulated drop".to_string()),
            SimulateArg::Silent => Self::Silent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_arg_conversion() {
        assert_eq!(UserType::from(UserTypeArg::Senior), UserType::Senior);
        assert_eq!(UserType::from(UserTypeArg::Volunteer), UserType::Volunteer);
    }

    #[test]
    fn test_specialty_arg_conversion() {
        assert_eq!(Specialty::from(SpecialtyArg::Internet), Specialty::Internet);
        assert_eq!(
            Specialty::from(SpecialtyArg::PhoneSettings),
            Specialty::PhoneSettings
        );
    }

    #[test]
    fn test_request_type_arg_conversion() {
        assert_eq!(
            RequestType::from(RequestTypeArg::Emergency),
            RequestType::Emergency
        );
        assert_eq!(
            RequestType::from(RequestTypeArg::AppSupport),
            RequestType::AppSupport
        );
    }

    #[test]
    fn test_strategy_arg_conversion() {
        assert_eq!(
            MatchStrategy::from(StrategyArg::FirstAvailable),
            MatchStrategy::FirstAvailable
        );
    }

    #[test]
    fn test_simulate_arg_conversion() {
        assert_eq!(SimulateArg::default(), SimulateArg::Connect);
        assert_eq!(
            SimulatedBehavior::from(SimulateArg::Silent),
            SimulatedBehavior::Silent
        );
        assert!(matches!(
            SimulatedBehavior::from(SimulateArg::Reject),
            SimulatedBehavior::RejectStart(_)
        ));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
