//! Command-line interface for seniorconnect.
//!
//! This module provides the CLI structure for the `seniorconnect` binary,
//! which stands in for the app's screens.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CallCommand, ConfigCommand, MatchCommand, RequestCommand, RequestTypeArg, SimulateArg,
    SpecialtyArg, StatusCommand, StrategyArg, UserCommand, UserTypeArg, VolunteerCommand,
};

/// seniorconnect - Tech help for seniors, one phone call away
///
/// Keeps a directory of volunteers, picks the best one available, and
/// walks a call to them from start to hang-up.
#[derive(Debug, Parser)]
#[command(name = "seniorconnect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the user of this device
    #[command(subcommand)]
    User(UserCommand),

    /// Manage the volunteer directory
    #[command(subcommand)]
    Volunteer(VolunteerCommand),

    /// Show which volunteer would be called
    Match(MatchCommand),

    /// Call a volunteer
    Call(CallCommand),

    /// Send a written help request to volunteers
    Request(RequestCommand),

    /// Show user, directory and storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
