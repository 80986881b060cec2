//! Middleware handler interface and registry.
//!
//! A middleware is an on-chain program that adds a check to a signer's
//! authorization path (time delay, pass check, recipient check). The client
//! side of each middleware knows which extra accounts the check needs and
//! whether a setup instruction must run before the proposal is submitted.
//!
//! The registry maps a middleware program id to its handler. It is built
//! once, then shared by reference with the proposal builder; there is no
//! process-wide instance.

use std::collections::BTreeMap;

use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;

use crate::errors::{CryptidError, CryptidResult};

/// Everything a handler may need to know about the signer it serves.
#[derive(Debug, Clone)]
pub struct SignerContext {
    pub signer: Pubkey,
    pub cryptid_account: Pubkey,
    pub cryptid_signer: Pubkey,
    pub did_account: Pubkey,
    /// Proposal account; `None` for direct execution.
    pub transaction_account: Option<Pubkey>,
    /// Middleware state account attached to the Cryptid account, if any.
    pub middleware_account: Option<Pubkey>,
}

/// Client side of a middleware program.
pub trait Middleware: Send + Sync {
    /// Stable, human-readable name.
    fn name(&self) -> &str;

    /// Accounts appended after the signer in every instruction it signs.
    fn extra_accounts(&self, ctx: &SignerContext) -> CryptidResult<Vec<AccountMeta>>;

    /// Instruction that must land before the proposal, if any.
    fn setup_instruction(&self, _ctx: &SignerContext) -> CryptidResult<Option<Instruction>> {
        Ok(None)
    }
}

/// Handlers keyed by middleware program id.
#[derive(Default)]
pub struct MiddlewareRegistry {
    handlers: BTreeMap<Pubkey, Box<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Insert or replace the handler for `program_id`. The last registration
    /// wins, which lets tests swap in mocks.
    pub fn register(&mut self, program_id: Pubkey, handler: Box<dyn Middleware>) {
        if let Some(old) = self.handlers.insert(program_id, handler) {
            tracing::debug!(%program_id, replaced = old.name(), "middleware handler replaced");
        }
    }

    pub fn get(&self, program_id: &Pubkey) -> CryptidResult<&dyn Middleware> {
        self.handlers
            .get(program_id)
            .map(|h| h.as_ref())
            .ok_or(CryptidError::MiddlewareNotFound(*program_id))
    }

    pub fn contains(&self, program_id: &Pubkey) -> bool {
        self.handlers.contains_key(program_id)
    }

    /// Iterate in program id order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pubkey, &dyn Middleware)> {
        self.handlers.iter().map(|(k, v)| (k, v.as_ref()))
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.handlers.iter().map(|(k, v)| (k, v.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Fixed(&'static str, usize);

    impl Middleware for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn extra_accounts(&self, _ctx: &SignerContext) -> CryptidResult<Vec<AccountMeta>> {
            Ok((0..self.1)
                .map(|_| AccountMeta::new_readonly(Pubkey::new_unique(), false))
                .collect())
        }
    }

    fn ctx() -> SignerContext {
        SignerContext {
            signer: Pubkey::new_unique(),
            cryptid_account: Pubkey::new_unique(),
            cryptid_signer: Pubkey::new_unique(),
            did_account: Pubkey::new_unique(),
            transaction_account: Some(Pubkey::new_unique()),
            middleware_account: None,
        }
    }

    #[test]
    fn last_registration_wins() {
        let id = Pubkey::new_unique();
        let mut reg = MiddlewareRegistry::new();
        reg.register(id, Box::new(Fixed("first", 1)));
        reg.register(id, Box::new(Fixed("second", 2)));
        assert_eq!(reg.len(), 1);
        let handler = reg.get(&id).unwrap();
        assert_eq!(handler.name(), "second");
        assert_eq!(handler.extra_accounts(&ctx()).unwrap().len(), 2);
        assert!(handler.setup_instruction(&ctx()).unwrap().is_none());
    }

    #[test]
    fn missing_handler() {
        let reg = MiddlewareRegistry::new();
        let id = Pubkey::new_unique();
        assert_matches!(reg.get(&id).map(|h| h.name()), Err(CryptidError::MiddlewareNotFound(k)) if k == id);
    }

    #[test]
    fn iteration_is_ordered() {
        let mut reg = MiddlewareRegistry::new();
        for _ in 0..5 {
            reg.register(Pubkey::new_unique(), Box::new(Fixed("x", 0)));
        }
        let ids: Vec<_> = reg.iter().map(|(k, _)| *k).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
