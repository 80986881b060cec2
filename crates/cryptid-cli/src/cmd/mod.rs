use anyhow::Result;

use crate::args::{Cli, Command};

mod address;
mod config;
mod doctor;
mod middleware;
mod proposal;
mod session;
mod show;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let path = cli.config.as_path();
    match cli.command {
        Command::Address { did, index } => address::run(path, did.as_deref(), index).await,
        Command::Propose { proposal, ready, staged } => proposal::propose(path, &proposal, ready, staged).await,
        Command::Approve { proposal, signer } => proposal::approve(path, &proposal, signer.as_deref()).await,
        Command::Execute {
            proposal,
            signer,
            funds_to,
            debug,
        } => proposal::execute(path, &proposal, signer.as_deref(), funds_to.as_deref(), debug).await,
        Command::Expire {
            proposal,
            signer,
            funds_to,
        } => proposal::expire(path, &proposal, signer.as_deref(), funds_to.as_deref()).await,
        Command::Show { seed } => show::run(path, &seed).await,
        Command::Middleware => middleware::run().await,
        Command::Config { action } => config::run(path, action).await,
        Command::Doctor => doctor::run(path).await,
    }
}
