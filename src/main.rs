#![warn(rust_2018_idioms, unused_lifetimes)]
#![allow(clippy::print_stderr, clippy::print_stdout)]

pub mod handlers;
pub mod models;
pub mod services;

use crate::handlers::{bundle, clean, doctor, setup};
use crate::models::args::{AppCommands, Cli};

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        AppCommands::Bundle { project_dir, icon, dry_run } => {
            bundle::run_bundle(project_dir.as_deref(), icon.as_deref(), dry_run)?;
        },
        AppCommands::Clean { project_dir } => clean::run_clean(project_dir.as_deref())?,
        AppCommands::Doctor { project_dir } => doctor::run_doctor(project_dir.as_deref())?,
        AppCommands::Setup { token, force, verify } => {
            setup::run_setup(token.as_deref(), force, verify)?;
        },
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}
