//! Command dispatch: bridges CLI args -> controller calls -> output formatting.

pub mod auth;
pub mod generate;
pub mod prefs;
pub mod roadmap;
pub mod util;

use raasta_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Generate(args) => generate::handle(controller, args, global).await,
        Command::Show(file) => roadmap::show(controller, file.file.as_deref(), global).await,
        Command::Skill { id, file } => {
            roadmap::skill(controller, &id, file.file.as_deref(), global).await
        }
        Command::Progress(file) => {
            roadmap::progress(controller, file.file.as_deref(), global).await
        }
        Command::Toggle { id, file } => {
            roadmap::toggle(controller, &id, file.file.as_deref(), global).await
        }
        Command::Export { path } => roadmap::export(controller, &path, global).await,
        Command::Import { path } => roadmap::import(controller, &path, global).await,
        Command::Login(args) => auth::login(controller, args, global).await,
        Command::Logout => auth::logout(controller, global).await,
        Command::Whoami => auth::whoami(controller, global).await,
        Command::Watch => auth::watch(controller, global).await,
        Command::Usage => prefs::usage(controller, global),
        Command::Prefs(args) => prefs::handle(controller, args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => Err(CliError::Internal(
            "completions must be handled before dispatch".into(),
        )),
    }
}
