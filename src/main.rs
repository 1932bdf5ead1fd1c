use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use handrest::config::{AppConfig, ConfigLoader};
use handrest::core::db::{
    Booking, BookingDb, BookingRepository, IdentityProvider, NewBooking, NewProfile, ProfileRepository,
    SignedInProfile, format_date, parse_date,
};
use handrest::core::lifecycle::{BookingLifecycle, BookingStatus, JobProjection, Role, TransitionError, TransitionErrorKind};
use handrest::telemetry;

#[derive(Parser)]
#[command(name = "handrest")]
#[command(about = "Manage cleaning bookings and staff jobs")]
struct Cli {
    /// SQLite database file (overrides HANDREST_DATABASE)
    #[arg(long, value_name = "PATH", global = true)]
    database: Option<PathBuf>,

    /// Load settings from this .env file first
    #[arg(long, value_name = "PATH", global = true)]
    env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage user profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Create and inspect bookings
    #[command(subcommand)]
    Booking(BookingCommand),

    /// Show active and completed jobs for a signed-in user
    Jobs {
        /// Email of the signed-in profile
        #[arg(long = "as", value_name = "EMAIL")]
        actor: String,
    },

    /// Move a booking to a new status
    Transition {
        booking_id: Uuid,
        /// Target status, e.g. in_progress
        status: BookingStatus,
        /// Email of the signed-in profile
        #[arg(long = "as", value_name = "EMAIL")]
        actor: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    Add {
        email: String,
        full_name: String,
        /// customer, staff or admin
        role: Role,
    },
}

#[derive(Subcommand)]
enum BookingCommand {
    /// Record a new pending booking
    Add {
        /// Email of the customer profile
        #[arg(long)]
        customer: String,
        /// Contact name (defaults to the profile's full name)
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// e.g. 09:00
        #[arg(long)]
        time: String,
        #[arg(long)]
        package: Option<String>,
    },
    /// Record which staff member will do the job
    Assign { booking_id: Uuid, staff_email: String },
    Show { booking_id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config: AppConfig = ConfigLoader::new(cli.env_file.clone()).load()?;
    if let Some(database) = cli.database.clone() {
        config.database = database;
    }
    if cli.verbose {
        config.log_filter = "debug".to_string();
    }
    telemetry::init_tracing(&config.log_filter);

    let db = BookingDb::open_with(&config.database, config.max_connections).await?;
    let result = run(&cli, &db).await;
    db.close().await?;
    result
}

async fn run(cli: &Cli, db: &BookingDb) -> anyhow::Result<()> {
    match &cli.command {
        Command::Profile(ProfileCommand::Add { email, full_name, role }) => {
            let profile = db
                .add_profile(&NewProfile {
                    email: email.clone(),
                    full_name: full_name.clone(),
                    role: *role,
                })
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("Added {} {} ({})", profile.role, profile.email, profile.id);
            }
        }
        Command::Booking(BookingCommand::Add {
            customer,
            name,
            phone,
            address,
            city,
            date,
            time,
            package,
        }) => {
            let profile = db
                .get_profile_by_email(customer)
                .await?
                .with_context(|| format!("No profile registered for {}", customer))?;
            let booking = db
                .add_booking(&NewBooking {
                    customer_id: profile.id,
                    customer_name: name.clone().unwrap_or_else(|| profile.full_name.clone()),
                    customer_phone: phone.clone(),
                    address_line1: address.clone(),
                    city: city.clone(),
                    package_name: package.clone(),
                    scheduled_date: parse_date(date)?,
                    scheduled_time: time.clone(),
                })
                .await?;
            print_booking(&booking, cli.json)?;
        }
        Command::Booking(BookingCommand::Assign { booking_id, staff_email }) => {
            let staff = db
                .get_profile_by_email(staff_email)
                .await?
                .with_context(|| format!("No profile registered for {}", staff_email))?;
            let booking = db
                .assign_staff(*booking_id, staff.id)
                .await?
                .with_context(|| format!("Booking not found: {}", booking_id))?;
            print_booking(&booking, cli.json)?;
        }
        Command::Booking(BookingCommand::Show { booking_id }) => {
            let booking = db
                .fetch_booking(*booking_id)
                .await?
                .with_context(|| format!("Booking not found: {}", booking_id))?;
            print_booking(&booking, cli.json)?;
        }
        Command::Jobs { actor } => {
            let identity = SignedInProfile::sign_in(db, actor).await?;
            let lifecycle = BookingLifecycle::new(db.clone());
            let projection = lifecycle.jobs_for(&identity.current_actor()).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&projection)?);
            } else {
                print_jobs(identity.display_name(), &projection)?;
            }
        }
        Command::Transition {
            booking_id,
            status,
            actor,
        } => {
            let identity = SignedInProfile::sign_in(db, actor).await?;
            let lifecycle = BookingLifecycle::new(db.clone());
            let role = identity.current_actor().role;
            match lifecycle.request_transition(*booking_id, *status, role).await {
                Ok(booking) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&booking)?);
                    } else {
                        println!("Status Updated: job marked as {}", booking.status.label());
                    }
                }
                Err(err) => anyhow::bail!("{} ({})", failure_message(&err), err),
            }
        }
    }
    Ok(())
}

fn failure_message(err: &TransitionError) -> &'static str {
    match err.kind() {
        TransitionErrorKind::NotFound => "Update Failed: this booking no longer exists.",
        TransitionErrorKind::InvalidTransition => "Update Failed: the booking cannot move to that status.",
        TransitionErrorKind::Forbidden => "Update Failed: you are not allowed to make this change.",
        TransitionErrorKind::ConcurrentModification | TransitionErrorKind::Store => {
            "Update Failed: Could not update status. Please try again."
        }
    }
}

fn print_booking(booking: &Booking, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(booking)?);
        return Ok(());
    }
    println!("{} [{}]", booking.booking_number, booking.status.label());
    println!("  id:       {}", booking.id);
    if let Some(package) = &booking.package_name {
        println!("  package:  {}", package);
    }
    println!("  customer: {} ({})", booking.customer_name, booking.customer_phone);
    println!("  address:  {}, {}", booking.address_line1, booking.city);
    println!("  when:     {} {}", format_date(booking.scheduled_date)?, booking.scheduled_time);
    if let Some(staff) = booking.assigned_staff_id {
        println!("  staff:    {}", staff);
    }
    Ok(())
}

fn print_jobs(display_name: &str, projection: &JobProjection) -> anyhow::Result<()> {
    let counts = projection.counts();
    println!("Staff Portal - {}", display_name);
    println!("Active Jobs: {}   Completed: {}", counts.active, counts.completed);

    println!("\nMy Jobs");
    if projection.active_jobs.is_empty() {
        println!("  No active jobs assigned");
    }
    for booking in &projection.active_jobs {
        print_booking(booking, false)?;
        let actions: Vec<String> = projection
            .actions(booking)
            .iter()
            .map(|status| status.to_string())
            .collect();
        if !actions.is_empty() {
            println!("  next:     {}", actions.join(", "));
        }
    }

    if !projection.completed_jobs.is_empty() {
        println!("\nCompleted");
        for booking in &projection.completed_jobs {
            println!("  {} {}", booking.booking_number, booking.customer_name);
        }
    }
    Ok(())
}
