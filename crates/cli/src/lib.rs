pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cartwright",
    about = "Cartwright operator CLI",
    long_about = "Operate Cartwright runtime readiness, migrations, catalog seeding, config inspection, and offline utterance parsing.",
    after_help = "Examples:\n  cartwright doctor --json\n  cartwright seed\n  cartwright parse \"add two lemonade\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo catalog fixture and verify the seeded rows")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, search endpoint, and DB connectivity readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run the parser stages over one utterance without touching the database")]
    Parse {
        #[arg(help = "The utterance to parse, quoted")]
        text: String,
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
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Parse { text } => commands::parse::run(&text),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
