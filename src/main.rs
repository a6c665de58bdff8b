use anyhow::Result;

use note_consensus::cli::Command;
use note_consensus::{handle_prepare, handle_score, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Score { io, overrides } => handle_score(io, overrides),
        Command::Prepare { io, overrides } => handle_prepare(io, overrides),
    }
}
