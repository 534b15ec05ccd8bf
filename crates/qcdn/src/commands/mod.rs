//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod activation;
pub mod allow_list;
pub mod config_cmd;
pub mod configs;
pub mod certificates;
pub mod sites;
pub mod templates;
pub mod util;

use qcdn_core::{AcceptancePolicy, SiteFacade};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a connection-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    facade: &SiteFacade,
    policy: AcceptancePolicy,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Sites(args) => sites::handle(facade, args, global).await,
        Command::Configs(args) => configs::handle(facade, args, global).await,
        Command::Activation(args) => activation::handle(facade, policy, args, global).await,
        Command::Certificates(args) => certificates::handle(facade, args, global).await,
        Command::Templates(args) => templates::handle(facade, args, global).await,
        Command::AllowList => allow_list::handle(facade, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
