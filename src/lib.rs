pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod errors;
pub mod output;
pub mod scoring;
pub mod services;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, IoArgs, SettingsArgs};

use crate::cli::Command;
use crate::config::AppConfig;
use crate::services::ScoringService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_score(io: &IoArgs, overrides: &SettingsArgs) -> Result<()> {
    let service = build_service(io, overrides)?;
    service.run()?;
    Ok(())
}

pub fn handle_prepare(io: &IoArgs, overrides: &SettingsArgs) -> Result<()> {
    let service = build_service(io, overrides)?;
    service.prepare()?;
    Ok(())
}

fn build_service(io: &IoArgs, overrides: &SettingsArgs) -> Result<ScoringService> {
    let config = overrides.apply(AppConfig::new());
    ScoringService::new(config, io.input_paths(), io.output_dir.clone())
}
