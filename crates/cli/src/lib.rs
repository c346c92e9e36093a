pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "kiosk",
    about = "Campus kiosk operator CLI",
    long_about = "Apply migrations, load the demo canteen, inspect configuration, check readiness and preview recommendations.",
    after_help = "Examples:\n  kiosk migrate\n  kiosk seed\n  kiosk doctor --json\n  kiosk recommend --user 19332"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo canteen catalog and accounts, keeping current stock levels")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, database schema and suggestion oracle readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print trending and ai recommendations as JSON")]
    Recommend {
        #[arg(long, value_name = "ADMISSION_NUMBER", help = "Focus ai picks on this user")]
        user: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Recommend { user } => commands::recommend::run(user.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
