//! Middleware specification types.
//!
//! A spec describes a middleware program for listings and name resolution:
//! - identity (stable id, display name, program id)
//! - the accounts its handler appends after a signer
//! - whether it needs a setup instruction before the proposal
//!
//! Specs are data only and never build instructions.

use std::collections::BTreeMap;

use anyhow::Result;
use solana_program::pubkey::Pubkey;

/// Stable middleware identifier, e.g. `time-delay`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MiddlewareId(pub String);

impl MiddlewareId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MiddlewareSpec {
    pub id: MiddlewareId,

    /// Human-readable display name.
    pub name: String,

    pub program: Pubkey,

    /// Accounts appended after the signer, in order.
    pub extra_accounts: Vec<String>,

    /// True if a setup instruction must land before the proposal.
    pub needs_setup: bool,

    /// Arbitrary metadata for listings.
    pub meta: BTreeMap<String, String>,
}

impl MiddlewareSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, program: Pubkey) -> Self {
        Self {
            id: MiddlewareId::new(id),
            name: name.into(),
            program,
            extra_accounts: Vec::new(),
            needs_setup: false,
            meta: BTreeMap::new(),
        }
    }

    pub fn extra_account(mut self, description: impl Into<String>) -> Self {
        self.extra_accounts.push(description.into());
        self
    }

    pub fn setup(mut self) -> Self {
        self.needs_setup = true;
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        let id = self.id.as_str();
        if id.trim().is_empty() {
            anyhow::bail!("middleware id is empty");
        }
        if !id.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
            anyhow::bail!("middleware id must be lowercase ASCII with dashes: {id}");
        }
        if self.name.trim().is_empty() {
            anyhow::bail!("middleware name is empty");
        }
        if self.program == Pubkey::default() {
            anyhow::bail!("middleware {id} has no program id");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_validate_ok() {
        let s = MiddlewareSpec::new("time-delay", "Time delay", Pubkey::new_unique())
            .extra_account("middleware account")
            .setup();
        s.validate().unwrap();
        assert!(s.needs_setup);
    }

    #[test]
    fn spec_validate_rejects_bad_ids() {
        assert!(MiddlewareSpec::new("", "X", Pubkey::new_unique()).validate().is_err());
        assert!(MiddlewareSpec::new("Time_Delay", "X", Pubkey::new_unique()).validate().is_err());
        assert!(MiddlewareSpec::new("x", "X", Pubkey::default()).validate().is_err());
    }
}
