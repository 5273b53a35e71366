mod api;
mod cli;
mod config;
mod engine;
mod models;
mod timetable;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use timetable::Timetable;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;
    let timetable = load_timetable(&config)?;

    match cli.command {
        Some(Commands::Settings { reset }) => {
            handlers::handle_settings(&timetable, &mut config, reset)?;
        }
        Some(Commands::Calc { counts, save }) => {
            handlers::handle_calc(&mut config, &counts, save)?;
        }
        Some(Commands::Plan { args, mode, limit }) => {
            handlers::handle_plan(&timetable, &config, &args, mode.as_deref(), limit)?;
        }
        Some(Commands::Compare { args }) => {
            handlers::handle_compare(&timetable, &config, &args)?;
        }
        Some(Commands::Simulate {
            counts,
            attend,
            skip,
        }) => {
            handlers::handle_simulate(&config, &counts, attend, skip)?;
        }
        Some(Commands::Timetable {
            division,
            upcoming,
            check,
        }) => {
            handlers::handle_timetable(&timetable, &config, division.as_deref(), upcoming, check)?;
        }
        Some(Commands::Divisions) => {
            handlers::handle_divisions(&timetable, &config)?;
        }
        Some(Commands::Api { route }) => {
            handlers::handle_api(&timetable, &config, &route)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(timetable, config)?;
        }
    }

    Ok(())
}

/// The configured TOML timetable, or the built-in one.
fn load_timetable(config: &AppConfig) -> Result<Timetable> {
    match &config.timetable.path {
        Some(path) => Timetable::from_toml_file(path)
            .with_context(|| format!("Loading timetable from {:?}", path)),
        None => Ok(timetable::builtin::timetable()),
    }
}
