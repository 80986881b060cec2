//! Proposal lifecycle and top-level instruction assembly.
//!
//! A wrapped transaction reaches the Cryptid program either directly (one
//! signer, no middleware, small enough for a single transaction) or through
//! a staged proposal:
//!
//! ```text
//! Unsigned -> Proposed -> Approved -> Executed
//!                  \          \
//!                   `----------`--> Expired
//! ```
//!
//! A proposal created with `ready_to_execute` may go straight from
//! `Proposed` to `Executed`. Approval counting and expiry enforcement happen
//! on-chain; the builder only keeps enough local state to refuse obviously
//! invalid sequences.
//!
//! The accounts array built at propose time is rebuilt from the same inputs
//! at execute time and must match element for element, otherwise the stored
//! indices would resolve to the wrong accounts.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::iter;

use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;

use crate::accounts::AccountsArray;
use crate::codec::InstructionData;
use crate::config::CryptidConfig;
use crate::errors::{CryptidError, CryptidResult};
use crate::instruction::{self, extras_count, ExecuteFlags, SignerMeta};
use crate::middleware::{MiddlewareRegistry, SignerContext};
use crate::pda::CryptidAccount;
use crate::size::{calculate_size, InstructionSize};
use crate::state::{Expiry, SignerEntry, TransactionAccountImage, TransactionState};

/// Who pays rent for the proposal account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Funder {
    /// The Cryptid account's own signer PDA.
    Cryptid,
    /// An external payer that signs the transaction.
    Payer(Pubkey),
}

/// Middleware gating a signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiddlewareRef {
    pub program: Pubkey,
    /// State account of the middleware attached to the Cryptid account.
    pub account: Option<Pubkey>,
}

/// A signer as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalSigner {
    pub key: Pubkey,
    pub middleware: Option<MiddlewareRef>,
    /// Accounts the caller already knows the signer needs.
    pub extra_accounts: Vec<AccountMeta>,
    pub expiry: Expiry,
}

impl ProposalSigner {
    pub fn new(key: Pubkey, expiry: Expiry) -> Self {
        Self {
            key,
            middleware: None,
            extra_accounts: Vec::new(),
            expiry,
        }
    }

    pub fn with_middleware(mut self, program: Pubkey, account: Option<Pubkey>) -> Self {
        self.middleware = Some(MiddlewareRef { program, account });
        self
    }

    pub fn with_extra_account(mut self, meta: AccountMeta) -> Self {
        self.extra_accounts.push(meta);
        self
    }
}

/// A signer with its middleware extras resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSigner {
    pub key: Pubkey,
    pub extras: Vec<AccountMeta>,
    pub expiry: Expiry,
}

impl ResolvedSigner {
    /// The signer followed by its extras, as they appear in account lists.
    pub fn metas(&self) -> impl Iterator<Item = AccountMeta> + '_ {
        iter::once(AccountMeta::new_readonly(self.key, true)).chain(self.extras.iter().cloned())
    }

    pub fn keys(&self) -> impl Iterator<Item = Pubkey> + '_ {
        iter::once(self.key).chain(self.extras.iter().map(|m| m.pubkey))
    }

    pub fn extras_count(&self) -> CryptidResult<u8> {
        extras_count(self.extras.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalState {
    Unsigned,
    Proposed,
    Approved,
    Executed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Propose,
    Approve,
    Execute,
    Expire,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Propose => "propose",
            Self::Approve => "approve",
            Self::Execute => "execute",
            Self::Expire => "expire",
        }
    }
}

impl ProposalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::Proposed => "proposed",
            Self::Approved => "approved",
            Self::Executed => "executed",
            Self::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::Expired)
    }

    /// State after `action`, or `InvalidStateTransition`.
    pub fn next(self, action: Action, ready_to_execute: bool) -> CryptidResult<Self> {
        use ProposalState::*;
        match (self, action) {
            (Unsigned, Action::Propose) => Ok(Proposed),
            (Proposed | Approved, Action::Approve) => Ok(Approved),
            (Approved, Action::Execute) => Ok(Executed),
            (Proposed, Action::Execute) if ready_to_execute => Ok(Executed),
            (Proposed | Approved, Action::Expire) => Ok(Expired),
            (from, action) => Err(CryptidError::InvalidStateTransition {
                from: from.as_str(),
                action: action.as_str(),
            }),
        }
    }
}

/// A staged transaction and everything needed to drive it to completion.
#[derive(Debug, Clone)]
pub struct Proposal {
    seed: String,
    cryptid_account: Pubkey,
    transaction_account: Pubkey,
    funder: Funder,
    transaction: Vec<Instruction>,
    requested: Vec<ProposalSigner>,
    signers: Vec<ResolvedSigner>,
    accounts: AccountsArray,
    instructions: Vec<InstructionData>,
    account_size: usize,
    ready_to_execute: bool,
    setup_instructions: Vec<Instruction>,
    propose_instruction: Instruction,
    state: ProposalState,
    approvals: BTreeSet<Pubkey>,
}

impl Proposal {
    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn transaction_account(&self) -> Pubkey {
        self.transaction_account
    }

    pub fn accounts(&self) -> &AccountsArray {
        &self.accounts
    }

    pub fn instructions(&self) -> &[InstructionData] {
        &self.instructions
    }

    pub fn signers(&self) -> &[ResolvedSigner] {
        &self.signers
    }

    pub fn account_size(&self) -> usize {
        self.account_size
    }

    pub fn ready_to_execute(&self) -> bool {
        self.ready_to_execute
    }

    pub fn state(&self) -> ProposalState {
        self.state
    }

    /// Signers an approve instruction has been built for.
    pub fn approvals(&self) -> &BTreeSet<Pubkey> {
        &self.approvals
    }

    /// Middleware setup instructions that must land before the proposal.
    pub fn setup_instructions(&self) -> &[Instruction] {
        &self.setup_instructions
    }

    pub fn propose_instruction(&self) -> &Instruction {
        &self.propose_instruction
    }

    /// Setup instructions followed by the propose instruction.
    pub fn submission(&self) -> Vec<Instruction> {
        let mut out = self.setup_instructions.clone();
        out.push(self.propose_instruction.clone());
        out
    }

    fn signer(&self, key: &Pubkey) -> CryptidResult<&ResolvedSigner> {
        self.signers
            .iter()
            .find(|s| s.key == *key)
            .ok_or(CryptidError::UnknownSigner(*key))
    }

    /// Adopt the lifecycle state of the proposal account read back from
    /// chain. Everything but the state and settings sequence must match the
    /// rebuilt proposal.
    pub fn sync(&mut self, image: &TransactionAccountImage) -> CryptidResult<()> {
        let expected = self.account_image(image.settings_sequence);
        if image.cryptid_account != expected.cryptid_account || image.accounts != expected.accounts {
            return Err(CryptidError::AccountsArrayMismatch);
        }
        if image.instructions != expected.instructions {
            return Err(CryptidError::ProposalMismatch("instructions"));
        }
        if image.signers != expected.signers {
            return Err(CryptidError::ProposalMismatch("signers"));
        }
        self.state = match image.state {
            TransactionState::NotReady => ProposalState::Proposed,
            TransactionState::Ready => ProposalState::Approved,
            TransactionState::Executed => ProposalState::Executed,
            TransactionState::Expired => ProposalState::Expired,
        };
        Ok(())
    }

    /// The proposal account contents the program writes at propose time.
    pub fn account_image(&self, settings_sequence: u16) -> TransactionAccountImage {
        TransactionAccountImage {
            cryptid_account: self.cryptid_account,
            accounts: self.accounts.keys().to_vec(),
            instructions: self.instructions.clone(),
            signers: self
                .signers
                .iter()
                .map(|s| SignerEntry {
                    key: s.key,
                    extras: s.extras.iter().map(|m| m.pubkey).collect(),
                    expiry: s.expiry,
                })
                .collect(),
            state: if self.ready_to_execute {
                TransactionState::Ready
            } else {
                TransactionState::NotReady
            },
            settings_sequence,
        }
    }
}

/// Outcome of [`ProposalBuilder::plan`].
#[derive(Debug, Clone)]
pub enum ExecutionPlan {
    Direct(Instruction),
    Staged(Proposal),
}

/// Builds Cryptid instructions for one Cryptid account.
pub struct ProposalBuilder<'a> {
    config: &'a CryptidConfig,
    registry: &'a MiddlewareRegistry,
    cryptid: CryptidAccount,
}

impl<'a> ProposalBuilder<'a> {
    pub fn new(config: &'a CryptidConfig, registry: &'a MiddlewareRegistry, cryptid: CryptidAccount) -> Self {
        Self {
            config,
            registry,
            cryptid,
        }
    }

    pub fn cryptid(&self) -> &CryptidAccount {
        &self.cryptid
    }

    pub fn transaction_account(&self, seed: &str) -> CryptidResult<Pubkey> {
        self.cryptid
            .transaction_account(&self.config.programs.cryptid, seed)
    }

    /// Check signers and collect their middleware extras and setup
    /// instructions, in signer order.
    pub fn resolve_signers(
        &self,
        signers: &[ProposalSigner],
        transaction_account: Option<Pubkey>,
    ) -> CryptidResult<(Vec<ResolvedSigner>, Vec<Instruction>)> {
        let mut seen = HashSet::with_capacity(signers.len());
        for signer in signers {
            if !seen.insert(signer.key) {
                return Err(CryptidError::DuplicateSigner(signer.key));
            }
            signer.expiry.validate()?;
        }

        let mut resolved = Vec::with_capacity(signers.len());
        let mut setup = Vec::new();
        for signer in signers {
            let mut extras = signer.extra_accounts.clone();
            if let Some(mw) = signer.middleware {
                let handler = self.registry.get(&mw.program)?;
                let ctx = SignerContext {
                    signer: signer.key,
                    cryptid_account: self.cryptid.address,
                    cryptid_signer: self.cryptid.signer,
                    did_account: self.cryptid.did_account,
                    transaction_account,
                    middleware_account: mw.account,
                };
                extras.extend(handler.extra_accounts(&ctx)?);
                if let Some(ix) = handler.setup_instruction(&ctx)? {
                    setup.push(ix);
                }
                tracing::debug!(
                    signer = %signer.key,
                    middleware = handler.name(),
                    extras = extras.len(),
                    "resolved middleware"
                );
            }
            extras_count(extras.len())?;
            resolved.push(ResolvedSigner {
                key: signer.key,
                extras,
                expiry: signer.expiry,
            });
        }
        Ok((resolved, setup))
    }

    fn funder_meta(&self, funder: Funder) -> AccountMeta {
        match funder {
            Funder::Cryptid => AccountMeta::new(self.cryptid.signer, false),
            Funder::Payer(key) => AccountMeta::new(key, true),
        }
    }

    /// Transaction account, Cryptid account, DID account, DID program.
    fn header_metas(&self, transaction_account: Pubkey) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(transaction_account, false),
            AccountMeta::new_readonly(self.cryptid.address, false),
            AccountMeta::new_readonly(self.cryptid.did_account, false),
            AccountMeta::new_readonly(self.config.programs.did, false),
        ]
    }

    /// Funder, transaction account, Cryptid account, DID account, DID
    /// program, system program.
    fn propose_metas(&self, funder: Funder, transaction_account: Pubkey) -> Vec<AccountMeta> {
        let mut metas = vec![self.funder_meta(funder)];
        metas.extend(self.header_metas(transaction_account));
        metas.push(AccountMeta::new_readonly(self.config.programs.system, false));
        metas
    }

    /// Instruction addresses in first-seen order, then the protocol accounts
    /// and each signer with its extras. Keys already present keep their
    /// first position.
    pub fn accounts_array(
        &self,
        transaction: &[Instruction],
        funder: Funder,
        transaction_account: Pubkey,
        signers: &[ResolvedSigner],
    ) -> CryptidResult<AccountsArray> {
        let mut accounts = AccountsArray::from_instructions(transaction)?;
        let protocol = self.propose_metas(funder, transaction_account);
        for key in protocol
            .iter()
            .map(|m| m.pubkey)
            .chain(signers.iter().flat_map(|s| s.keys()))
        {
            accounts.insert(key)?;
        }
        accounts.check_limit(self.config.limits.max_accounts)?;
        Ok(accounts)
    }

    /// Build the propose instruction. `ready_to_execute` defaults to true for
    /// a single signer without middleware extras.
    pub fn propose(
        &self,
        transaction: Vec<Instruction>,
        funder: Funder,
        signers: &[ProposalSigner],
        seed: &str,
        ready_to_execute: Option<bool>,
    ) -> CryptidResult<Proposal> {
        if transaction.is_empty() && signers.is_empty() {
            return Err(CryptidError::EmptyTransaction);
        }
        let transaction_account = self.transaction_account(seed)?;
        let requested = signers.to_vec();
        let (signers, setup_instructions) = self.resolve_signers(&requested, Some(transaction_account))?;
        let accounts = self.accounts_array(&transaction, funder, transaction_account, &signers)?;

        let instructions = transaction
            .iter()
            .map(|ix| InstructionData::from_instruction(ix, &accounts))
            .collect::<CryptidResult<Vec<_>>>()?;

        let extras: Vec<usize> = signers.iter().map(|s| s.extras.len()).collect();
        let account_size = calculate_size(accounts.len(), &InstructionSize::all(&instructions), &extras);

        let ready_to_execute = ready_to_execute
            .unwrap_or_else(|| matches!(signers.as_slice(), [only] if only.extras.is_empty()));

        let signer_metas = signers
            .iter()
            .map(|s| {
                Ok(SignerMeta {
                    extras: s.extras_count()?,
                    expiry: s.expiry,
                })
            })
            .collect::<CryptidResult<Vec<_>>>()?;

        let data = instruction::propose_transaction(
            signer_metas,
            account_size,
            accounts.keys(),
            instructions.clone(),
            ready_to_execute,
            seed,
        )?;

        let mut keys = self.propose_metas(funder, transaction_account);
        keys.extend(signers.iter().flat_map(|s| s.metas()));

        tracing::debug!(
            transaction_account = %transaction_account,
            accounts = accounts.len(),
            instructions = instructions.len(),
            signers = signers.len(),
            account_size,
            ready_to_execute,
            "built propose instruction"
        );

        let state = ProposalState::Unsigned.next(Action::Propose, ready_to_execute)?;
        Ok(Proposal {
            seed: seed.to_string(),
            cryptid_account: self.cryptid.address,
            transaction_account,
            funder,
            transaction,
            requested,
            signers,
            accounts,
            instructions,
            account_size,
            ready_to_execute,
            setup_instructions,
            propose_instruction: Instruction {
                program_id: self.config.programs.cryptid,
                accounts: keys,
                data,
            },
            state,
            approvals: BTreeSet::new(),
        })
    }

    /// Re-derive the proposal account and check the proposal belongs to this
    /// builder's Cryptid account.
    fn rederive(&self, proposal: &Proposal) -> CryptidResult<Pubkey> {
        let transaction_account = self.transaction_account(&proposal.seed)?;
        if transaction_account != proposal.transaction_account {
            return Err(CryptidError::invalid_argument(format!(
                "proposal {} does not belong to cryptid account {}",
                proposal.transaction_account, self.cryptid.address
            )));
        }
        Ok(transaction_account)
    }

    pub fn approve(&self, proposal: &mut Proposal, signer: &Pubkey) -> CryptidResult<Instruction> {
        let transaction_account = self.rederive(proposal)?;
        let entry = proposal.signer(signer)?;
        let next = proposal.state.next(Action::Approve, proposal.ready_to_execute)?;

        let mut keys = self.header_metas(transaction_account);
        keys.extend(entry.metas());
        let data = instruction::approve_transaction(entry.extras_count()?, entry.expiry)?;

        proposal.state = next;
        proposal.approvals.insert(*signer);
        tracing::debug!(%transaction_account, signer = %signer, "built approve instruction");
        Ok(Instruction {
            program_id: self.config.programs.cryptid,
            accounts: keys,
            data,
        })
    }

    /// Build the execute instruction. The proposal's rent goes to `funds_to`.
    pub fn execute(
        &self,
        proposal: &mut Proposal,
        signer: &Pubkey,
        funds_to: Pubkey,
        flags: ExecuteFlags,
    ) -> CryptidResult<Instruction> {
        let transaction_account = self.rederive(proposal)?;
        let entry = proposal.signer(signer)?;
        let next = proposal.state.next(Action::Execute, proposal.ready_to_execute)?;

        // Extras are resolved again against this builder's registry.
        let (signers, _) = self.resolve_signers(&proposal.requested, Some(transaction_account))?;
        let accounts = self.accounts_array(&proposal.transaction, proposal.funder, transaction_account, &signers)?;
        if signers != proposal.signers || accounts != proposal.accounts {
            return Err(CryptidError::AccountsArrayMismatch);
        }

        let mut keys = self.header_metas(transaction_account);
        keys.extend(entry.metas());
        keys.push(AccountMeta::new(funds_to, false));
        keys.extend(self.execution_metas(&accounts, &proposal.transaction));
        let data = instruction::execute_transaction(entry.extras_count()?, flags)?;

        proposal.state = next;
        tracing::debug!(
            %transaction_account,
            signer = %signer,
            accounts = accounts.len(),
            "built execute instruction"
        );
        Ok(Instruction {
            program_id: self.config.programs.cryptid,
            accounts: keys,
            data,
        })
    }

    pub fn expire(&self, proposal: &mut Proposal, signer: &Pubkey, funds_to: Pubkey) -> CryptidResult<Instruction> {
        let transaction_account = self.rederive(proposal)?;
        let entry = proposal.signer(signer)?;
        let next = proposal.state.next(Action::Expire, proposal.ready_to_execute)?;

        let mut keys = self.header_metas(transaction_account);
        keys.extend(entry.metas());
        keys.push(AccountMeta::new(funds_to, false));
        let data = instruction::expire_transaction(entry.extras_count()?)?;

        proposal.state = next;
        Ok(Instruction {
            program_id: self.config.programs.cryptid,
            accounts: keys,
            data,
        })
    }

    /// Every accounts array entry with the flags the wrapped instructions
    /// need. The Cryptid signer is signed for by the program, never by the
    /// transaction.
    fn execution_metas(&self, accounts: &AccountsArray, transaction: &[Instruction]) -> Vec<AccountMeta> {
        let flags = resolve_flags(transaction, &self.cryptid.signer);
        accounts
            .keys()
            .iter()
            .map(|key| {
                let (is_signer, is_writable) = flags.get(key).copied().unwrap_or_default();
                AccountMeta {
                    pubkey: *key,
                    is_signer,
                    is_writable,
                }
            })
            .collect()
    }

    /// Single-transaction execution without a proposal account. Indices in
    /// the payload address the instruction's own account list.
    pub fn direct_execute(
        &self,
        transaction: &[Instruction],
        signer: &ProposalSigner,
        flags: ExecuteFlags,
    ) -> CryptidResult<Instruction> {
        if transaction.is_empty() {
            return Err(CryptidError::EmptyTransaction);
        }
        if signer.middleware.is_some() {
            return Err(CryptidError::invalid_argument(
                "signers gated by middleware need a staged proposal",
            ));
        }
        let (resolved, _) = self.resolve_signers(std::slice::from_ref(signer), None)?;
        let entry = &resolved[0];

        let mut prefix = vec![
            AccountMeta::new_readonly(self.cryptid.address, false),
            AccountMeta::new_readonly(self.cryptid.did_account, false),
            AccountMeta::new_readonly(self.config.programs.did, false),
        ];
        prefix.extend(entry.metas());

        let mut accounts = AccountsArray::new();
        for meta in &prefix {
            accounts.insert(meta.pubkey)?;
        }
        accounts.extend_from_instructions(transaction)?;
        accounts.check_limit(self.config.limits.max_accounts)?;

        let instructions = transaction
            .iter()
            .map(|ix| InstructionData::from_instruction(ix, &accounts))
            .collect::<CryptidResult<Vec<_>>>()?;

        let required = resolve_flags(transaction, &self.cryptid.signer);
        let base: HashMap<Pubkey, AccountMeta> = prefix.into_iter().map(|m| (m.pubkey, m)).collect();
        let keys = accounts
            .keys()
            .iter()
            .map(|key| {
                let mut meta = base
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| AccountMeta::new_readonly(*key, false));
                if let Some((is_signer, is_writable)) = required.get(key) {
                    meta.is_signer |= is_signer;
                    meta.is_writable |= is_writable;
                }
                meta
            })
            .collect();

        let data = instruction::direct_execute(entry.extras_count()?, instructions, flags)?;
        Ok(Instruction {
            program_id: self.config.programs.cryptid,
            accounts: keys,
            data,
        })
    }

    /// Execute directly when possible, otherwise stage a proposal.
    pub fn plan(
        &self,
        transaction: Vec<Instruction>,
        funder: Funder,
        signers: &[ProposalSigner],
        seed: &str,
    ) -> CryptidResult<ExecutionPlan> {
        if let [signer] = signers {
            if signer.middleware.is_none() && signer.extra_accounts.is_empty() && !transaction.is_empty() {
                let ix = self.direct_execute(&transaction, signer, ExecuteFlags::default())?;
                let fee_payer = match funder {
                    Funder::Payer(key) => key,
                    Funder::Cryptid => signer.key,
                };
                let size = estimate_transaction_size(&ix, &fee_payer);
                if size <= self.config.limits.max_transaction_size {
                    tracing::debug!(size, "executing directly");
                    return Ok(ExecutionPlan::Direct(ix));
                }
                tracing::debug!(
                    size,
                    max = self.config.limits.max_transaction_size,
                    "direct execution too large, staging proposal"
                );
            }
        }
        self.propose(transaction, funder, signers, seed, None)
            .map(ExecutionPlan::Staged)
    }
}

/// `(is_signer, is_writable)` per key across all instructions. Program ids
/// are read-only; `cryptid_signer` never needs a transaction signature.
fn resolve_flags(transaction: &[Instruction], cryptid_signer: &Pubkey) -> HashMap<Pubkey, (bool, bool)> {
    let mut flags: HashMap<Pubkey, (bool, bool)> = HashMap::new();
    for ix in transaction {
        flags.entry(ix.program_id).or_default();
        for meta in &ix.accounts {
            let entry = flags.entry(meta.pubkey).or_default();
            entry.0 |= meta.is_signer && meta.pubkey != *cryptid_signer;
            entry.1 |= meta.is_writable;
        }
    }
    flags
}

fn short_vec_len(n: usize) -> usize {
    match n {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        _ => 3,
    }
}

/// Serialized size of a legacy transaction carrying only `ix`, paid by
/// `fee_payer`.
pub fn estimate_transaction_size(ix: &Instruction, fee_payer: &Pubkey) -> usize {
    let mut keys: HashMap<Pubkey, bool> = HashMap::new();
    keys.insert(*fee_payer, true);
    keys.entry(ix.program_id).or_insert(false);
    for meta in &ix.accounts {
        *keys.entry(meta.pubkey).or_insert(false) |= meta.is_signer;
    }
    let signatures = keys.values().filter(|s| **s).count();

    short_vec_len(signatures)
        + 64 * signatures
        + 3
        + short_vec_len(keys.len())
        + 32 * keys.len()
        + 32
        + short_vec_len(1)
        + 1
        + short_vec_len(ix.accounts.len())
        + ix.accounts.len()
        + short_vec_len(ix.data.len())
        + ix.data.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn state_machine_transitions() {
        use ProposalState::*;
        assert_eq!(Unsigned.next(Action::Propose, false).unwrap(), Proposed);
        assert_eq!(Proposed.next(Action::Approve, false).unwrap(), Approved);
        assert_eq!(Approved.next(Action::Approve, false).unwrap(), Approved);
        assert_eq!(Approved.next(Action::Execute, false).unwrap(), Executed);
        assert_eq!(Proposed.next(Action::Execute, true).unwrap(), Executed);
        assert_eq!(Proposed.next(Action::Expire, false).unwrap(), Expired);
        assert_eq!(Approved.next(Action::Expire, false).unwrap(), Expired);
    }

    #[test]
    fn invalid_transitions() {
        use ProposalState::*;
        assert_matches!(
            Proposed.next(Action::Execute, false),
            Err(CryptidError::InvalidStateTransition { from: "proposed", action: "execute" })
        );
        assert!(Unsigned.next(Action::Approve, true).is_err());
        for terminal in [Executed, Expired] {
            assert!(terminal.is_terminal());
            for action in [Action::Propose, Action::Approve, Action::Execute, Action::Expire] {
                assert!(terminal.next(action, true).is_err());
            }
        }
    }

    #[test]
    fn flags_merge_across_instructions() {
        let program = Pubkey::new_unique();
        let pda = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let ixs = vec![
            Instruction::new_with_bytes(program, &[], vec![AccountMeta::new_readonly(a, false), AccountMeta::new(pda, true)]),
            Instruction::new_with_bytes(program, &[], vec![AccountMeta::new(a, true)]),
        ];
        let flags = resolve_flags(&ixs, &pda);
        assert_eq!(flags[&a], (true, true));
        assert_eq!(flags[&pda], (false, true));
        assert_eq!(flags[&program], (false, false));
    }

    #[test]
    fn short_vec_boundaries() {
        assert_eq!(short_vec_len(0), 1);
        assert_eq!(short_vec_len(127), 1);
        assert_eq!(short_vec_len(128), 2);
        assert_eq!(short_vec_len(16_383), 2);
        assert_eq!(short_vec_len(16_384), 3);
    }

    #[test]
    fn size_estimate_matches_message_serialization() {
        use solana_program::message::Message;

        let payer = Pubkey::new_unique();
        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1; 40],
            vec![
                AccountMeta::new(Pubkey::new_unique(), true),
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
                AccountMeta::new(payer, true),
            ],
        );
        let message = Message::new(&[ix.clone()], Some(&payer));
        let signatures = message.header.num_required_signatures as usize;
        let expected = 1 + 64 * signatures + message.serialize().len();
        assert_eq!(estimate_transaction_size(&ix, &payer), expected);
    }
}
