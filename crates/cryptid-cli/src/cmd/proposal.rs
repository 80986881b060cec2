//! propose, approve, execute, expire.
//!
//! Each command rebuilds the proposal from the transaction file and seed,
//! so the accounts array is identical to the one stored at propose time.

use std::path::Path;

use anyhow::{anyhow, Result};
use cryptid_core::instruction::ExecuteFlags;
use cryptid_core::proposal::{ExecutionPlan, Proposal};
use serde::Serialize;

use crate::args::ProposalArgs;
use crate::cmd::session::Session;
use crate::config::parse_pubkey;
use crate::output;
use crate::solana::tx::TxPlan;

#[derive(Debug, Serialize)]
pub struct ProposalOut {
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_to_execute: Option<bool>,
    pub state: &'static str,
    #[serde(flatten)]
    pub plan: TxPlan,
}

impl ProposalOut {
    fn staged(proposal: &Proposal, plan: TxPlan) -> Self {
        Self {
            mode: "staged",
            transaction_account: Some(proposal.transaction_account().to_string()),
            account_size: Some(proposal.account_size()),
            ready_to_execute: Some(proposal.ready_to_execute()),
            state: proposal.state().as_str(),
            plan,
        }
    }
}

pub async fn propose(config: &Path, args: &ProposalArgs, ready: Option<bool>, staged: bool) -> Result<()> {
    let session = Session::load(config, None, None)?;
    let tx = session.transaction(&args.file)?;
    let builder = session.builder();

    let plan = if staged || ready.is_some() {
        ExecutionPlan::Staged(builder.propose(tx.instructions, tx.funder, &tx.signers, &args.seed, ready)?)
    } else {
        builder.plan(tx.instructions, tx.funder, &tx.signers, &args.seed)?
    };

    let out = match plan {
        ExecutionPlan::Direct(ix) => ProposalOut {
            mode: "direct",
            transaction_account: None,
            account_size: None,
            ready_to_execute: None,
            state: if args.send { "executed" } else { "unsigned" },
            plan: session.emit(args.send, &[ix])?,
        },
        ExecutionPlan::Staged(proposal) => {
            let plan = session.emit(args.send, &proposal.submission())?;
            ProposalOut::staged(&proposal, plan)
        }
    };
    output::print(&out)
}

/// Rebuild the proposal. When sending, its state is taken from the account
/// on chain; otherwise readiness is left for the program to enforce.
fn rebuild(session: &Session, args: &ProposalArgs) -> Result<Proposal> {
    let tx = session.transaction(&args.file)?;
    let builder = session.builder();
    if !args.send {
        return Ok(builder.propose(tx.instructions, tx.funder, &tx.signers, &args.seed, Some(true))?);
    }

    let mut proposal = builder.propose(tx.instructions, tx.funder, &tx.signers, &args.seed, None)?;
    let image = session
        .client()
        .fetch_proposal(&proposal.transaction_account())?
        .ok_or_else(|| anyhow!("proposal account {} not found", proposal.transaction_account()))?;
    proposal.sync(&image)?;
    Ok(proposal)
}

pub async fn approve(config: &Path, args: &ProposalArgs, signer: Option<&str>) -> Result<()> {
    let session = Session::load(config, None, None)?;
    let signer = session.signer(signer)?;
    let mut proposal = rebuild(&session, args)?;

    let ix = session.builder().approve(&mut proposal, &signer)?;
    let plan = session.emit(args.send, &[ix])?;
    output::print(&ProposalOut::staged(&proposal, plan))
}

pub async fn execute(
    config: &Path,
    args: &ProposalArgs,
    signer: Option<&str>,
    funds_to: Option<&str>,
    debug: bool,
) -> Result<()> {
    let session = Session::load(config, None, None)?;
    let signer = session.signer(signer)?;
    let funds_to = funds_to.map(parse_pubkey).transpose()?.unwrap_or(signer);
    let flags = if debug { ExecuteFlags::DEBUG } else { ExecuteFlags::default() };
    let mut proposal = rebuild(&session, args)?;

    let ix = session.builder().execute(&mut proposal, &signer, funds_to, flags)?;
    let plan = session.emit(args.send, &[ix])?;
    output::print(&ProposalOut::staged(&proposal, plan))
}

pub async fn expire(config: &Path, args: &ProposalArgs, signer: Option<&str>, funds_to: Option<&str>) -> Result<()> {
    let session = Session::load(config, None, None)?;
    let signer = session.signer(signer)?;
    let funds_to = funds_to.map(parse_pubkey).transpose()?.unwrap_or(signer);
    let mut proposal = rebuild(&session, args)?;

    let ix = session.builder().expire(&mut proposal, &signer, funds_to)?;
    let plan = session.emit(args.send, &[ix])?;
    output::print(&ProposalOut::staged(&proposal, plan))
}
