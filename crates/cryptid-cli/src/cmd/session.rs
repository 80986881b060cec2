//! Per-command state: configuration, middleware, and the Cryptid account in
//! use.

use std::path::Path;

use anyhow::{anyhow, Result};
use cryptid_core::config::CryptidConfig;
use cryptid_core::middleware::MiddlewareRegistry;
use cryptid_core::pda::CryptidAccount;
use cryptid_core::proposal::{ProposalBuilder, ProposalSigner};
use cryptid_core::state::Expiry;
use cryptid_middleware::builtin::builtin_catalog;
use cryptid_middleware::{register_builtins, BuiltinOptions, MiddlewareCatalog};
use cryptid_solana_client::CryptidClient;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;

use crate::config::{parse_pubkey, CliConfig};
use crate::io::input::{read_transaction_file, WrappedTransaction};
use crate::solana::tx::TxPlan;

pub struct Session {
    pub cli: CliConfig,
    pub config: CryptidConfig,
    pub catalog: MiddlewareCatalog,
    pub registry: MiddlewareRegistry,
    pub account: CryptidAccount,
}

impl Session {
    pub fn load(path: &Path, did: Option<&str>, index: Option<u32>) -> Result<Self> {
        let cli = CliConfig::load(path)?;
        let config = cli.core()?;

        let mut registry = MiddlewareRegistry::new();
        register_builtins(
            &mut registry,
            &BuiltinOptions {
                gatekeeper_network: cli.gatekeeper_network()?,
            },
        );

        let did = cli.did(did)?;
        let account = CryptidAccount::derive(&config.programs, did, index.or(cli.index))?;
        tracing::debug!(%did, cryptid_account = %account.address, "session loaded");

        Ok(Self {
            cli,
            config,
            catalog: builtin_catalog()?,
            registry,
            account,
        })
    }

    pub fn builder(&self) -> ProposalBuilder<'_> {
        ProposalBuilder::new(&self.config, &self.registry, self.account)
    }

    pub fn client(&self) -> CryptidClient {
        CryptidClient::with_rpc(self.config.clone(), &self.cli.rpc_url(self.account.did.cluster))
    }

    /// Read and resolve a transaction file. Without listed signers the
    /// configured keypair signs alone.
    pub fn transaction(&self, file: &Path) -> Result<WrappedTransaction> {
        let mut tx = read_transaction_file(file)?.resolve(&self.account.signer, &self.catalog)?;
        if tx.signers.is_empty() {
            tx.signers.push(ProposalSigner::new(self.cli.keypair()?.pubkey(), Expiry::Never));
        }
        Ok(tx)
    }

    /// `--signer`, or the configured keypair.
    pub fn signer(&self, arg: Option<&str>) -> Result<Pubkey> {
        match arg {
            Some(s) => parse_pubkey(s),
            None => Ok(self.cli.keypair()?.pubkey()),
        }
    }

    /// Send `ixs` signed by the configured keypair, or just describe them.
    /// Only the keypair can sign, so every required signer must be it.
    pub fn emit(&self, send: bool, ixs: &[Instruction]) -> Result<TxPlan> {
        let mut plan = TxPlan::new(ixs);
        if !send {
            return Ok(plan);
        }
        let payer = self.cli.keypair()?;
        if let Some(other) = ixs
            .iter()
            .flat_map(|ix| ix.accounts.iter())
            .find(|m| m.is_signer && m.pubkey != payer.pubkey())
        {
            return Err(anyhow!(
                "{} must sign but only the configured keypair {} is available",
                other.pubkey,
                payer.pubkey()
            ));
        }
        tracing::info!(plan = %plan.describe(), "sending");
        plan.signature = Some(self.client().send_transaction(&payer, &[], ixs)?);
        Ok(plan)
    }
}
