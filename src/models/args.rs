//! # CLI Argument Definitions
//!
//! This module defines the command-line interface (CLI) structure using the `clap` crate.
//! It specifies the available subcommands, arguments, and flags for the application.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "wfpack")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Packaging toolkit for the Whisper Fedora desktop application")]
pub struct Cli {
    /// Print diagnostic detail (repeat for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// The main subcommand to execute.
    #[command(subcommand)]
    pub command: AppCommands,
}

/// Enumeration of available application subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Package the application into a standalone macOS bundle
    Bundle {
        /// Path to the Whisper Fedora checkout (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,

        /// Bundle icon (defaults to packaging/icon.icns inside the checkout, omitted if absent)
        #[arg(long, value_name = "FILE")]
        icon: Option<PathBuf>,

        /// Print the resolved packaging plan without deleting or executing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove build artifacts from a previous packaging run
    Clean {
        /// Path to the Whisper Fedora checkout (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,
    },
    /// Check the local toolchain and project layout without changing anything
    Doctor {
        /// Path to the Whisper Fedora checkout (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,
    },
    /// Configure speaker diarization (Hugging Face token and dependencies)
    Setup {
        /// Hugging Face access token (prompted for when omitted)
        #[arg(short, long)]
        token: Option<String>,

        /// Replace an already-configured token
        #[arg(short, long)]
        force: bool,

        /// Test model access against Hugging Face after saving the token
        #[arg(long)]
        verify: bool,
    },
}
