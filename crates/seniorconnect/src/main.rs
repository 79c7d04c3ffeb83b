//! `seniorconnect` - CLI for SeniorConnect
//!
//! This binary stands in for the app's screens: it registers the device user,
//! manages the volunteer directory, and walks a simulated call to the matched
//! volunteer.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::broadcast;

use seniorconnect::call::{CallManager, CallState, SimulatedProvider};
use seniorconnect::cli::{
    CallCommand, Cli, Command, ConfigCommand, MatchCommand, RequestCommand, UserCommand,
    VolunteerCommand,
};
use seniorconnect::matching::{available_count, CallTarget, MatchStrategy};
use seniorconnect::models::{Specialty, Volunteer};
use seniorconnect::notify::{submit_help_request, LogNotifier};
use seniorconnect::{
    init_logging, Config, Error, Event, EventBus, KeyValueStore, SqliteStore, UserStore,
    VolunteerDirectory,
};

/// Delay between simulated provider callbacks, so the states are visible.
const SIMULATED_STEP_DELAY: Duration = Duration::from_millis(300);

/// Everything a command needs, wired together before it runs.
#[derive(Debug)]
struct App {
    store: Arc<SqliteStore>,
    events: EventBus,
    users: UserStore,
    directory: VolunteerDirectory,
}

impl App {
    fn open(config: &Config) -> anyhow::Result<Self> {
        let path = config.database_path();
        let store = Arc::new(
            SqliteStore::open(&path)
                .with_context(|| format!("opening database at {}", path.display()))?,
        );
        let kv: Arc<dyn KeyValueStore> = Arc::clone(&store) as Arc<dyn KeyValueStore>;
        let events = EventBus::new();

        let users = UserStore::load(Arc::clone(&kv), events.clone());
        let mut directory = VolunteerDirectory::load(kv, events.clone());
        if config.directory.seed_sample_volunteers {
            directory.seed_samples();
        }

        Ok(Self {
            store,
            events,
            users,
            directory,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::User(cmd) => handle_user(&mut App::open(&config)?, cmd),
        Command::Volunteer(cmd) => handle_volunteer(&mut App::open(&config)?, cmd),
        Command::Match(cmd) => {
            handle_match(&App::open(&config)?, &config, &cmd);
            Ok(())
        }
        Command::Call(cmd) => handle_call(&App::open(&config)?, &config, &cmd).await,
        Command::Request(cmd) => handle_request(&mut App::open(&config)?, &cmd),
        Command::Status(cmd) => handle_status(&App::open(&config)?, &config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_user(app: &mut App, cmd: UserCommand) -> anyhow::Result<()> {
    match cmd {
        UserCommand::Register {
            name,
            phone,
            user_type,
        } => {
            let user = app.users.register(&name, &phone, user_type.into())?;
            println!("{}", user.user_type.banner());
            println!();
            println!("Welcome, {}!", user.name);
            println!("  Account:  {}", user.user_type.account_label());
            println!("  Id:       {}", user.id);
        }
        UserCommand::Login { phone } => {
            if !app.users.login(&phone) {
                bail!("No registered user with that phone number");
            }
            if let Some(user) = app.users.current_user() {
                println!("Logged in as {}.", user.name);
            }
        }
        UserCommand::Logout => {
            app.users.logout();
            println!("Logged out.");
        }
        UserCommand::Show { json } => match app.users.current_user() {
            Some(user) if json => println!("{}", serde_json::to_string_pretty(user)?),
            Some(user) => {
                println!("Registered User");
                println!("===============");
                println!("  Name:     {}", user.name);
                println!("  Phone:    {}", user.phone_number);
                println!("  Account:  {}", user.user_type.account_label());
                if let Some(method) = &user.preferred_contact_method {
                    println!("  Contact:  {method}");
                }
                println!("  Id:       {}", user.id);
            }
            None => println!("No user registered on this device."),
        },
        UserCommand::Edit {
            name,
            phone,
            contact_method,
        } => {
            if name.is_none() && phone.is_none() && contact_method.is_none() {
                println!("Nothing to change.");
                return Ok(());
            }
            let updated = app.users.update(|user| {
                if let Some(name) = name {
                    user.name = name.trim().to_string();
                }
                if let Some(phone) = phone {
                    user.phone_number = phone.trim().to_string();
                }
                if contact_method.is_some() {
                    user.preferred_contact_method = contact_method;
                }
            })?;
            if !updated {
                bail!("No user registered on this device");
            }
            println!("Profile updated.");
        }
        UserCommand::Clear { yes } => {
            if yes {
                app.users.clear();
                println!("User removed from this device.");
            } else {
                println!("This will remove the registered user from this device.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_volunteer(app: &mut App, cmd: VolunteerCommand) -> anyhow::Result<()> {
    match cmd {
        VolunteerCommand::Add {
            name,
            email,
            phone,
            specialties,
            rating,
            unavailable,
        } => {
            let volunteer = Volunteer::new(name.trim(), email.trim(), phone.trim())
                .with_specialties(specialties.into_iter().map(Specialty::from))
                .with_rating(rating)
                .with_availability(!unavailable);
            let id = volunteer.id;
            app.directory.add(volunteer)?;
            println!("Added volunteer {id}");
        }
        VolunteerCommand::List { available, json } => {
            let volunteers: Vec<&Volunteer> = app
                .directory
                .list()
                .iter()
                .filter(|v| !available || v.is_available)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&volunteers)?);
            } else if volunteers.is_empty() {
                println!("No volunteers.");
            } else {
                for v in volunteers {
                    let specialties: Vec<&str> =
                        v.specialties.iter().map(|s| s.label()).collect();
                    println!(
                        "{}  {:<20} {:.1}  {:<11} {}",
                        v.id,
                        v.name,
                        v.rating,
                        if v.is_available { "available" } else { "busy" },
                        specialties.join(", ")
                    );
                }
            }
        }
        VolunteerCommand::Available { id, off } => {
            let volunteer = app.directory.update(id, |v| v.is_available = !off)?;
            println!(
                "{} is now {}.",
                volunteer.name,
                if volunteer.is_available {
                    "available"
                } else {
                    "unavailable"
                }
            );
        }
        VolunteerCommand::Rate { id, rating } => {
            let volunteer = app.directory.update(id, |v| v.rating = rating)?;
            println!("{} is now rated {:.1}.", volunteer.name, volunteer.rating);
        }
        VolunteerCommand::Remove { id } => {
            if app.directory.remove(id) {
                println!("Removed volunteer {id}");
            } else {
                println!("No volunteer {id}");
            }
        }
        VolunteerCommand::Seed => {
            let added = app.directory.seed_samples();
            if added == 0 {
                println!("Directory is not empty; nothing seeded.");
            } else {
                println!("Added {added} sample volunteers.");
            }
        }
    }
    Ok(())
}

fn handle_match(app: &App, config: &Config, cmd: &MatchCommand) {
    let strategy = cmd
        .strategy
        .map_or(config.matching.strategy, MatchStrategy::from);

    match strategy.select(&app.directory) {
        Some(v) => {
            println!("Best match ({strategy}):");
            println!("  Name:    {}", v.name);
            println!("  Phone:   {}", v.phone_number);
            println!("  Rating:  {:.1}", v.rating);
        }
        None => println!("No volunteers are available right now. Please try again later."),
    }
}

async fn handle_call(app: &App, config: &Config, cmd: &CallCommand) -> anyhow::Result<()> {
    let volunteer = match cmd.volunteer {
        Some(id) => app
            .directory
            .get(id)
            .ok_or_else(|| Error::not_found("volunteer", id))?,
        None => match config.matching.strategy.select(&app.directory) {
            Some(v) => v,
            None => {
                println!("No volunteers are available right now. Please try again later.");
                return Ok(());
            }
        },
    };
    if !volunteer.is_available {
        println!("Note: {} is marked unavailable.", volunteer.name);
    }
    let target = CallTarget::from(volunteer);

    if !cmd.yes && !confirm(&format!("Call {} now?", target.display_name))? {
        println!("Call cancelled.");
        return Ok(());
    }

    let (provider, mut provider_events) =
        SimulatedProvider::from_config(cmd.simulate.into(), config);
    let provider = provider.with_step_delay(SIMULATED_STEP_DELAY);
    let mut calls = CallManager::from_config(Arc::new(provider), app.events.clone(), config);
    let mut states = app.events.subscribe();

    println!("Calling {} at {}...", target.display_name, target.phone_number);
    let started = calls.call(&target).await;
    print_call_states(&mut states);
    started?;

    let reached = calls
        .drive_until(&mut provider_events, |s| s == CallState::Active)
        .await;
    print_call_states(&mut states);
    if reached != CallState::Active {
        bail!("Could not connect to {}", target.display_name);
    }

    println!("Connected. Hanging up in {} ms...", cmd.hold_ms);
    tokio::time::sleep(Duration::from_millis(cmd.hold_ms)).await;

    calls.end_call().await?;
    calls.drive_until(&mut provider_events, |_| false).await;
    print_call_states(&mut states);
    println!("Call ended.");
    Ok(())
}

fn handle_request(app: &mut App, cmd: &RequestCommand) -> anyhow::Result<()> {
    if !app.users.login(&cmd.phone) {
        bail!("No registered user with that phone number");
    }

    let request = submit_help_request(
        &app.users,
        &app.events,
        &LogNotifier,
        &cmd.title,
        &cmd.description,
        cmd.request_type.into(),
    )?;
    println!("Help request sent: {}", request.title);
    println!("  Type:     {}", request.request_type.label());
    println!("  Urgency:  {:?}", request.urgency());
    println!("A volunteer will be in touch soon.");
    Ok(())
}

fn handle_status(app: &App, config: &Config, json: bool) -> anyhow::Result<()> {
    let stats = app.store.stats()?;
    let user = app.users.current_user();
    let available = available_count(&app.directory);

    if json {
        let status = serde_json::json!({
            "user": user.map(|u| &u.name),
            "volunteers": app.directory.len(),
            "available_volunteers": available,
            "matching_strategy": config.matching.strategy,
            "database_path": app.store.path(),
            "keys": app.store.keys()?,
            "value_bytes": stats.value_bytes,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("seniorconnect status");
        println!("--------------------");
        match user {
            Some(u) => println!("User:          {} ({})", u.name, u.user_type),
            None => println!("User:          not registered"),
        }
        println!(
            "Volunteers:    {} ({} available)",
            app.directory.len(),
            available
        );
        println!("Matching:      {}", config.matching.strategy);
        println!("Database:      {}", app.store.path().display());
        println!(
            "Records:       {} ({} bytes)",
            stats.record_count, stats.value_bytes
        );
        println!("Database size: {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Calls]");
                println!("  App name:           {}", config.calls.app_name);
                println!("  Start timeout (ms): {}", config.calls.start_timeout_ms);
                println!("  End timeout (ms):   {}", config.calls.end_timeout_ms);
                println!();
                println!("[Matching]");
                println!("  Strategy:           {}", config.matching.strategy);
                println!();
                println!("[Directory]");
                println!(
                    "  Seed samples:       {}",
                    config.directory.seed_sample_volunteers
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_call_states(rx: &mut broadcast::Receiver<Event>) {
    while let Ok(event) = rx.try_recv() {
        if let Event::CallStateChanged { state, .. } = event {
            println!("  [{state}]");
        }
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
