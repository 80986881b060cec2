//! The deduplicated accounts array.
//!
//! Encoded instructions never carry raw addresses; they carry one-byte
//! positions into this array. The array keeps first-seen order (receivers
//! rebuild identical indices from it) and a hash index beside it so that
//! membership checks stay constant time for large transactions.

use std::collections::HashMap;

use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;

use crate::constants::MAX_ACCOUNTS;
use crate::errors::{CryptidError, CryptidResult};

#[derive(Debug, Clone, Default)]
pub struct AccountsArray {
    keys: Vec<Pubkey>,
    index: HashMap<Pubkey, u8>,
}

impl AccountsArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program ids and account keys of `instructions`, in first-seen order.
    pub fn from_instructions(instructions: &[Instruction]) -> CryptidResult<Self> {
        let mut out = Self::new();
        out.extend_from_instructions(instructions)?;
        Ok(out)
    }

    /// Rebuild from an already ordered key list (e.g. read back from chain).
    /// Duplicates are rejected because they would make indices ambiguous.
    pub fn from_keys(keys: Vec<Pubkey>) -> CryptidResult<Self> {
        let mut out = Self::new();
        for key in &keys {
            if out.contains(key) {
                return Err(CryptidError::invalid_argument(format!(
                    "duplicate key {key} in accounts array"
                )));
            }
            out.insert(*key)?;
        }
        Ok(out)
    }

    pub fn extend_from_instructions(&mut self, instructions: &[Instruction]) -> CryptidResult<()> {
        for ix in instructions {
            self.insert(ix.program_id)?;
            for meta in &ix.accounts {
                self.insert(meta.pubkey)?;
            }
        }
        Ok(())
    }

    /// Insert `key` if absent and return its index.
    pub fn insert(&mut self, key: Pubkey) -> CryptidResult<u8> {
        if let Some(i) = self.index.get(&key) {
            return Ok(*i);
        }
        let len = self.keys.len();
        if len >= MAX_ACCOUNTS {
            return Err(CryptidError::AccountArrayOverflow {
                len: len + 1,
                max: MAX_ACCOUNTS,
            });
        }
        let i = len as u8;
        self.keys.push(key);
        self.index.insert(key, i);
        Ok(i)
    }

    pub fn index_of(&self, key: &Pubkey) -> CryptidResult<u8> {
        self.index
            .get(key)
            .copied()
            .ok_or(CryptidError::AccountNotInArray(*key))
    }

    pub fn get(&self, index: u8) -> CryptidResult<&Pubkey> {
        self.keys
            .get(index as usize)
            .ok_or(CryptidError::IndexOutOfBounds {
                index: index as usize,
                len: self.keys.len(),
            })
    }

    pub fn contains(&self, key: &Pubkey) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[Pubkey] {
        &self.keys
    }

    /// Fail if the array is larger than `max` (a configured limit below the
    /// index width).
    pub fn check_limit(&self, max: usize) -> CryptidResult<()> {
        if self.keys.len() > max {
            return Err(CryptidError::AccountArrayOverflow {
                len: self.keys.len(),
                max,
            });
        }
        Ok(())
    }
}

impl PartialEq for AccountsArray {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl Eq for AccountsArray {}
