//! RPC client for the Cryptid program.
//!
//! This client can:
//! - derive the Cryptid account of a DID
//! - fetch and decode proposal accounts
//! - submit transactions built by the proposal builder
//!
//! RPC failures are returned as-is with context attached; nothing is retried.

use anyhow::{anyhow, Context, Result};
use cryptid_core::config::CryptidConfig;
use cryptid_core::did::{Cluster, Did};
use cryptid_core::pda::CryptidAccount;
use cryptid_core::proposal::Proposal;
use cryptid_core::state::TransactionAccountImage;
use solana_client::rpc_client::RpcClient;
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::account::Account;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;

/// Public RPC endpoint for a cluster.
pub fn default_rpc_url(cluster: Cluster) -> &'static str {
    match cluster {
        Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        Cluster::Devnet => "https://api.devnet.solana.com",
        Cluster::Testnet => "https://api.testnet.solana.com",
        Cluster::Localnet => "http://127.0.0.1:8899",
    }
}

pub struct CryptidClient {
    pub config: CryptidConfig,
    pub rpc: Option<RpcClient>,
}

impl CryptidClient {
    pub fn new(config: CryptidConfig) -> Self {
        Self { config, rpc: None }
    }

    pub fn with_rpc(config: CryptidConfig, rpc_url: &str) -> Self {
        Self {
            config,
            rpc: Some(RpcClient::new(rpc_url.to_string())),
        }
    }

    fn rpc(&self) -> Result<&RpcClient> {
        self.rpc.as_ref().ok_or_else(|| anyhow!("rpc client not configured"))
    }

    pub fn cryptid_account(&self, did: Did, index: Option<u32>) -> Result<CryptidAccount> {
        CryptidAccount::derive(&self.config.programs, did, index)
            .with_context(|| format!("derive cryptid account for {did}"))
    }

    pub fn account_exists(&self, key: &Pubkey) -> Result<bool> {
        let rpc = self.rpc()?;
        let resp = rpc
            .get_account_with_commitment(key, rpc.commitment())
            .with_context(|| format!("get account {key}"))?;
        Ok(resp.value.is_some())
    }

    /// Read a proposal account. `None` if it does not exist (never proposed,
    /// or closed by execute/expire).
    pub fn fetch_proposal(&self, transaction_account: &Pubkey) -> Result<Option<TransactionAccountImage>> {
        let rpc = self.rpc()?;
        let resp = rpc
            .get_account_with_commitment(transaction_account, rpc.commitment())
            .with_context(|| format!("get proposal account {transaction_account}"))?;
        resp.value
            .map(|account| parse_proposal_account(&account, &self.config.programs.cryptid))
            .transpose()
    }

    /// Submit a transaction. Requires the client to be constructed with RPC.
    pub fn send_transaction(&self, payer: &Keypair, signers: &[&Keypair], ixs: &[Instruction]) -> Result<String> {
        let rpc = self.rpc()?;
        let bh = rpc.get_latest_blockhash().context("get latest blockhash")?;

        let mut all: Vec<&dyn Signer> = vec![payer];
        all.extend(signers.iter().map(|k| *k as &dyn Signer));

        let tx = Transaction::new_signed_with_payer(ixs, Some(&payer.pubkey()), all.as_slice(), bh);
        let sig = rpc
            .send_and_confirm_transaction(&tx)
            .context("send transaction")?;
        tracing::info!(signature = %sig, instructions = ixs.len(), "transaction confirmed");
        Ok(sig.to_string())
    }

    /// Submit middleware setup instructions and the propose instruction in
    /// one transaction.
    pub fn submit_proposal(&self, payer: &Keypair, signers: &[&Keypair], proposal: &Proposal) -> Result<String> {
        tracing::info!(
            transaction_account = %proposal.transaction_account(),
            account_size = proposal.account_size(),
            "submitting proposal"
        );
        self.send_transaction(payer, signers, &proposal.submission())
    }
}

/// Decode a proposal account fetched from chain.
pub fn parse_proposal_account(account: &Account, cryptid_program: &Pubkey) -> Result<TransactionAccountImage> {
    if account.owner != *cryptid_program {
        anyhow::bail!(
            "account is owned by {}, expected the cryptid program {cryptid_program}",
            account.owner
        );
    }
    TransactionAccountImage::decode(&account.data).context("decode proposal account")
}
