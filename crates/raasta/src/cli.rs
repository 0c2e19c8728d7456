//! Clap derive structures for the `raasta` CLI.
//!
//! Subcommands, global flags, and the value enums they parse into.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// raasta -- career roadmaps from the command line
#[derive(Debug, Parser)]
#[command(
    name = "raasta",
    version,
    about = "Generate and track Smart Raasta career roadmaps",
    long_about = "Generate a personalised career roadmap, track which skills you have\n\
        completed, and keep it saved to your account between sessions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Roadmap service URL (overrides config)
    #[arg(long, env = "RAASTA_SERVER_URL", global = true)]
    pub server: Option<String>,

    /// Output format [default: config `output`, else table]
    #[arg(long, short = 'o', env = "RAASTA_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Colorize human-readable output [default: config `color`, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Language for generated roadmaps (e.g. en, ur)
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Log more to stderr (repeat for debug and trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print nothing but errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "RAASTA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Bypass the local generation limit
    #[arg(long, env = "RAASTA_ADMIN", global = true, hide = true)]
    pub admin: bool,
}

impl GlobalOpts {
    pub fn output_format(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Table)
    }

    pub fn color_mode(&self) -> &ColorMode {
        self.color.as_ref().unwrap_or(&ColorMode::Auto)
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable detail view
    Table,
    /// Pretty-printed JSON
    Json,
    /// JSON on one line
    JsonCompact,
    /// YAML
    Yaml,
    /// Bare values for shell pipelines
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal and NO_COLOR is unset
    Auto,
    /// Always colorize
    Always,
    /// Never colorize
    Never,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a new roadmap
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Show the current roadmap
    Show(FileArg),

    /// Show one skill in detail
    Skill {
        /// Skill ID (see `raasta show`)
        id: String,
        #[command(flatten)]
        file: FileArg,
    },

    /// Show completion progress
    Progress(FileArg),

    /// Mark a skill completed, or back to incomplete
    Toggle {
        /// Skill ID (see `raasta show`)
        id: String,
        #[command(flatten)]
        file: FileArg,
    },

    /// Save the account's roadmap to a JSON file
    Export {
        /// Destination file
        path: PathBuf,
    },

    /// Replace the account's roadmap with a JSON file
    Import {
        /// Previously exported roadmap
        path: PathBuf,
    },

    /// Sign in with an emailed one-time code
    Login(LoginArgs),

    /// Sign out and forget the session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Stay running and report session expiry
    Watch,

    /// Show how many generations are left this hour
    Usage,

    /// View and change preferences
    Prefs(PrefsArgs),

    /// Print a shell completion script
    Completions(CompletionsArgs),
}

/// Work on a local roadmap file instead of the account.
#[derive(Debug, Args)]
pub struct FileArg {
    /// Roadmap JSON file (skips the network entirely)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Career goal, e.g. "Data Science"
    #[arg(long, short = 'g')]
    pub goal: String,

    /// Interests and hobbies
    #[arg(long, short = 'i', default_value = "")]
    pub interests: String,

    /// Current education level
    #[arg(long, short = 'e', default_value = "")]
    pub education: String,

    /// City or region
    #[arg(long, short = 'l', default_value = "")]
    pub location: String,

    /// Also write the roadmap to this file
    #[arg(long)]
    pub save_to: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long)]
    pub email: Option<String>,

    /// One-time code from the email (prompted when omitted)
    #[arg(long)]
    pub code: Option<String>,

    /// Save this local roadmap to the account once signed in
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub command: PrefsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// Show stored preferences
    Show,

    /// Set the default generation language
    SetLang {
        /// Language code, e.g. en or ur
        lang: String,
    },

    /// Set the color theme
    SetTheme {
        #[arg(value_enum)]
        theme: ThemeArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Dark,
    Light,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
