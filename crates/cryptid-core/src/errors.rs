//! Error types for cryptid-core.
//!
//! Errors fall into three groups:
//! - input validation (bad DID, empty transaction, duplicate signer, overflow)
//! - invariant violations (an address missing from the accounts array, an
//!   index out of bounds while decoding); these mean the builder produced
//!   inconsistent state and the build must abort
//! - middleware lookup failures
//!
//! Transport and on-chain failures are not represented here; they are
//! surfaced unmodified by the client crate.

use solana_program::pubkey::Pubkey;
use thiserror::Error;

pub type CryptidResult<T> = Result<T, CryptidError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptidError {
    #[error("invalid DID format: {0}")]
    InvalidDidFormat(String),

    #[error("DID not found: {0}")]
    DidNotFound(String),

    #[error("no valid bump seed found for {0}")]
    AddressDerivationExhausted(&'static str),

    #[error("account {0} is not in the accounts array")]
    AccountNotInArray(Pubkey),

    #[error("account index {index} out of bounds for {len} accounts")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("accounts array differs from the one built at propose time")]
    AccountsArrayMismatch,

    #[error("proposal account {0} differ from the rebuilt proposal")]
    ProposalMismatch(&'static str),

    #[error("truncated data: needed {needed} bytes, {remaining} remaining")]
    TruncatedData { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after decoded value")]
    TrailingData(usize),

    #[error("invalid account meta flags: {0:#04x}")]
    InvalidAccountMeta(u8),

    #[error("unknown instruction discriminant: {0}")]
    UnknownDiscriminant(u8),

    #[error("transaction has no instructions and no signers")]
    EmptyTransaction,

    #[error("duplicate signer: {0}")]
    DuplicateSigner(Pubkey),

    #[error("signer {0} is not part of the proposal")]
    UnknownSigner(Pubkey),

    #[error("accounts array holds {len} entries, max is {max}")]
    AccountArrayOverflow { len: usize, max: usize },

    #[error("no middleware registered for program {0}")]
    MiddlewareNotFound(Pubkey),

    #[error("middleware {program}: {message}")]
    Middleware { program: Pubkey, message: String },

    #[error("cannot {action} a proposal in state {from}")]
    InvalidStateTransition { from: &'static str, action: &'static str },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CryptidError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_did(did: impl Into<String>) -> Self {
        Self::InvalidDidFormat(did.into())
    }

    pub fn truncated(needed: usize, remaining: usize) -> Self {
        Self::TruncatedData { needed, remaining }
    }

    /// True for errors that indicate a builder bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::AccountNotInArray(_)
                | Self::IndexOutOfBounds { .. }
                | Self::AccountsArrayMismatch
        )
    }
}
