//! cryptid-core
//!
//! Client-side primitives for Cryptid, the DID-controlled transaction layer
//! on Solana:
//! - DID parsing and address derivation (DID account, Cryptid account and
//!   signer, proposal accounts)
//! - The deduplicated accounts array and compact instruction encoding
//! - Proposal account sizing
//! - Cryptid instruction payloads and the proposal builder
//! - The middleware handler registry
//!
//! Nothing in this crate performs network I/O.

pub mod accounts;
pub mod codec;
pub mod config;
pub mod constants;
pub mod did;
pub mod errors;
pub mod instruction;
pub mod middleware;
pub mod pda;
pub mod proposal;
pub mod size;
pub mod state;

pub use crate::errors::{CryptidError, CryptidResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::accounts::AccountsArray;
    pub use crate::codec::{decode, encode, AbbreviatedAccountMeta, InstructionData};
    pub use crate::config::{CryptidConfig, LimitsConfig, ProgramIds};
    pub use crate::did::{Cluster, Did, DidKeys, DidResolver, GenerativeResolver};
    pub use crate::instruction::{CryptidInstruction, ExecuteFlags};
    pub use crate::middleware::{Middleware, MiddlewareRegistry, SignerContext};
    pub use crate::pda::CryptidAccount;
    pub use crate::proposal::{
        ExecutionPlan, Funder, Proposal, ProposalBuilder, ProposalSigner, ProposalState,
    };
    pub use crate::size::{calculate_size, InstructionSize};
    pub use crate::state::{Expiry, TransactionAccountImage};
    pub use crate::{CryptidError, CryptidResult};
}
