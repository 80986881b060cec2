//! Transaction file input.
//!
//! ```json
//! {
//!   "funder": "cryptid",
//!   "signers": [
//!     { "key": "<pubkey>", "middleware": "time-delay", "middleware_account": "<pubkey>", "expiry": 1900000000 }
//!   ],
//!   "instructions": [
//!     {
//!       "program_id": "11111111111111111111111111111111",
//!       "accounts": [{ "pubkey": "cryptid", "is_signer": true, "is_writable": true }],
//!       "data": "02000000e803000000000000"
//!     }
//!   ]
//! }
//! ```
//!
//! The literal `cryptid` may stand in for any key and resolves to the
//! Cryptid signer, whose address depends on the DID and index in use.
//! `funder` is `cryptid` or a payer pubkey; `expiry` is optional, and `0`
//! means the signer never expires.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use cryptid_core::proposal::{Funder, ProposalSigner};
use cryptid_core::state::Expiry;
use cryptid_middleware::MiddlewareCatalog;
use serde::Deserialize;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::config::parse_pubkey;

pub const CRYPTID_PLACEHOLDER: &str = "cryptid";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionFile {
    #[serde(default = "default_funder")]
    pub funder: String,
    #[serde(default)]
    pub signers: Vec<SignerInput>,
    pub instructions: Vec<InstructionInput>,
}

fn default_funder() -> String {
    CRYPTID_PLACEHOLDER.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignerInput {
    pub key: String,
    #[serde(default)]
    pub middleware: Option<String>,
    #[serde(default)]
    pub middleware_account: Option<String>,
    #[serde(default)]
    pub extra_accounts: Vec<AccountInput>,
    #[serde(default)]
    pub expiry: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountInput {
    pub pubkey: String,
    #[serde(default)]
    pub is_signer: bool,
    #[serde(default)]
    pub is_writable: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstructionInput {
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<AccountInput>,
    /// Hex-encoded instruction data.
    #[serde(default)]
    pub data: String,
}

/// Parsed transaction file with placeholders resolved.
#[derive(Debug, Clone)]
pub struct WrappedTransaction {
    pub funder: Funder,
    pub signers: Vec<ProposalSigner>,
    pub instructions: Vec<Instruction>,
}

pub fn read_transaction_file<P: AsRef<Path>>(path: P) -> Result<TransactionFile> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| anyhow!("invalid transaction file {}: {e}", path.display()))
}

impl TransactionFile {
    /// Resolve keys against the Cryptid signer and middleware names against
    /// `catalog`.
    pub fn resolve(&self, cryptid_signer: &Pubkey, catalog: &MiddlewareCatalog) -> Result<WrappedTransaction> {
        let key = |s: &str| -> Result<Pubkey> {
            if s == CRYPTID_PLACEHOLDER {
                Ok(*cryptid_signer)
            } else {
                parse_pubkey(s)
            }
        };
        let meta = |a: &AccountInput| -> Result<AccountMeta> {
            Ok(AccountMeta {
                pubkey: key(&a.pubkey)?,
                is_signer: a.is_signer,
                is_writable: a.is_writable,
            })
        };

        let funder = if self.funder == CRYPTID_PLACEHOLDER {
            Funder::Cryptid
        } else {
            Funder::Payer(parse_pubkey(&self.funder)?)
        };

        let signers = self
            .signers
            .iter()
            .map(|s| {
                let expiry = s.expiry.map_or(Expiry::Never, Expiry::from_wire);
                let mut signer = ProposalSigner::new(key(&s.key)?, expiry);
                if let Some(mw) = &s.middleware {
                    let account = s.middleware_account.as_deref().map(key).transpose()?;
                    signer = signer.with_middleware(catalog.resolve_program(mw)?, account);
                }
                for extra in &s.extra_accounts {
                    signer = signer.with_extra_account(meta(extra)?);
                }
                Ok(signer)
            })
            .collect::<Result<Vec<_>>>()?;

        let instructions = self
            .instructions
            .iter()
            .enumerate()
            .map(|(i, ix)| {
                Ok(Instruction {
                    program_id: key(&ix.program_id)?,
                    accounts: ix.accounts.iter().map(meta).collect::<Result<_>>()?,
                    data: hex::decode(ix.data.trim_start_matches("0x"))
                        .with_context(|| format!("instruction {i}: data is not hex"))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(WrappedTransaction {
            funder,
            signers,
            instructions,
        })
    }
}
