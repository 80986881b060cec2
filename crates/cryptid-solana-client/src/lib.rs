//! cryptid-solana-client
//!
//! A small, focused RPC client for the Cryptid program.
//!
//! It includes:
//! - default RPC endpoints per cluster
//! - a client that derives Cryptid accounts, reads proposal accounts and
//!   submits transactions built by `cryptid-core`
//!
//! Instruction building stays in `cryptid-core`; this crate only moves bytes
//! to and from a validator.

pub mod client;

pub use client::*;
