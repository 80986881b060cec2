use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "cryptid", version, about = "Cryptid CLI: DID-controlled Solana transactions")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: .cryptid/config.json)
    #[arg(long, global = true, default_value = ".cryptid/config.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Identifies a proposal: the transaction file it was built from plus its
/// seed. Approve, execute and expire rebuild the proposal from these.
#[derive(Args, Debug, Clone)]
pub struct ProposalArgs {
    /// Transaction file (JSON: instructions, signers, funder).
    pub file: PathBuf,

    /// Proposal account seed.
    #[arg(long)]
    pub seed: String,

    /// Submit the transaction with the configured keypair instead of
    /// printing the instructions.
    #[arg(long)]
    pub send: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the DID account, Cryptid account and signer addresses.
    Address {
        /// DID (default: config `did`, or the keypair's generative DID).
        #[arg(long)]
        did: Option<String>,

        /// Cryptid account index (default: config `index`, or 0).
        #[arg(long)]
        index: Option<u32>,
    },

    /// Build a proposal, or a direct execution when it fits one transaction.
    Propose {
        #[command(flatten)]
        proposal: ProposalArgs,

        /// Override the ready-to-execute flag.
        #[arg(long)]
        ready: Option<bool>,

        /// Always stage a proposal, even when direct execution would fit.
        #[arg(long)]
        staged: bool,
    },

    /// Approve a proposal as one of its signers.
    Approve {
        #[command(flatten)]
        proposal: ProposalArgs,

        /// Approving signer (default: the configured keypair).
        #[arg(long)]
        signer: Option<String>,
    },

    /// Execute an approved (or ready) proposal.
    Execute {
        #[command(flatten)]
        proposal: ProposalArgs,

        #[arg(long)]
        signer: Option<String>,

        /// Receives the proposal account's rent (default: the signer).
        #[arg(long)]
        funds_to: Option<String>,

        /// Ask the program for debug logs.
        #[arg(long)]
        debug: bool,
    },

    /// Expire a proposal and reclaim its rent.
    Expire {
        #[command(flatten)]
        proposal: ProposalArgs,

        #[arg(long)]
        signer: Option<String>,

        #[arg(long)]
        funds_to: Option<String>,
    },

    /// Read a proposal account from chain.
    Show {
        /// Proposal account seed.
        #[arg(long)]
        seed: String,
    },

    /// List built-in middleware.
    Middleware,

    /// Show or change the CLI configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run environment checks.
    Doctor,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration.
    Show,

    /// Set a key: rpc_url, keypair, did, index, gatekeeper_network,
    /// cryptid_program, did_program.
    Set { key: String, value: String },

    /// Clear a key.
    Unset { key: String },
}
