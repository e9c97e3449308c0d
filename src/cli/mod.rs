//! CLI module - Command line interface definitions and handlers

pub mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// LacakTani - Crop ripeness detection client
///
/// Sends field photos to a LacakTani classifier server, shows per-image
/// ripeness counts and keeps the detection history up to date.
#[derive(Parser, Debug)]
#[command(name = "lacaktani")]
#[command(version)]
#[command(about = "🌱 Crop ripeness detection client", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Classifier server base URL (overrides the config file)
    #[arg(long, short, global = true)]
    pub server: Option<String>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify images (files or folders), one at a time
    Detect(DetectArgs),

    /// List, switch, delete or upload classifier models
    #[command(subcommand)]
    Models(ModelsCommand),

    /// Update detection settings on the server
    Settings(SettingsArgs),

    /// Browse, delete or export saved detections
    #[command(subcommand)]
    History(HistoryCommand),

    /// Show the statistics panel and recent-detections chart
    Dashboard,

    /// Show or change the colour theme
    Theme(ThemeArgs),

    /// Show the config file location, or create it
    Config(ConfigArgs),

    /// Menu-driven session (default)
    Interactive,
}

#[derive(Debug, Clone, Parser)]
pub struct DetectArgs {
    /// Images or folders containing images
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Save annotated images as <name>_result.jpg in this folder
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ModelsCommand {
    /// List models on the server; the active one is marked
    List,

    /// Make a model the active one
    Use {
        /// Model file name as listed
        name: String,
    },

    /// Delete a model (the active model cannot be deleted)
    Delete {
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Upload a .pt weights file
    Upload {
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Parser)]
pub struct SettingsArgs {
    /// Minimum detection confidence, 0 to 1
    #[arg(long, short)]
    pub confidence: f32,
}

#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    /// List saved detections, newest first
    List,

    /// Delete one saved detection
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Download the server's history export
    Export {
        /// Destination file (default: riwayat_deteksi.csv in the current folder)
        #[arg(long, short)]
        dest: Option<PathBuf>,

        /// Open the file after downloading
        #[arg(long)]
        open: bool,
    },
}

#[derive(Debug, Clone, Parser)]
pub struct ThemeArgs {
    #[arg(value_enum, default_value = "show")]
    pub action: ThemeAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch to the light theme
    Light,
    /// Switch to the dark theme
    Dark,
    /// Switch to the other theme
    Toggle,
}

#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Write a commented default config if none exists
    #[arg(long)]
    pub init: bool,
}
