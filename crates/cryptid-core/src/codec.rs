//! Compact, index-addressed instruction encoding.
//!
//! Layout of one encoded instruction (all integers little-endian):
//!
//! ```text
//! program_id   u8                  index into the accounts array
//! accounts     u32 len, then len x { key: u8, meta: u8 }
//! data         u32 len, then len bytes
//! ```
//!
//! `meta` packs the signer/writable flags of the account reference. Every
//! variable-length sequence is length-prefixed so a decoder can stream
//! without backtracking. The account size calculator in [`crate::size`]
//! mirrors this layout and must change with it.

use bytes::{Buf, BufMut};
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;

use crate::accounts::AccountsArray;
use crate::errors::{CryptidError, CryptidResult};

/// Flag bits of [`AbbreviatedAccountMeta::meta`].
pub mod meta_flags {
    pub const IS_SIGNER: u8 = 1 << 0;
    pub const IS_WRITABLE: u8 = 1 << 1;
    pub const ALL: u8 = IS_SIGNER | IS_WRITABLE;
}

/// An account reference by index, with packed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbbreviatedAccountMeta {
    pub key: u8,
    pub meta: u8,
}

impl AbbreviatedAccountMeta {
    pub const SIZE: usize = 2;

    pub fn from_account_meta(meta: &AccountMeta, accounts: &AccountsArray) -> CryptidResult<Self> {
        let mut flags = 0;
        if meta.is_signer {
            flags |= meta_flags::IS_SIGNER;
        }
        if meta.is_writable {
            flags |= meta_flags::IS_WRITABLE;
        }
        Ok(Self {
            key: accounts.index_of(&meta.pubkey)?,
            meta: flags,
        })
    }

    pub fn to_account_meta(&self, accounts: &AccountsArray) -> CryptidResult<AccountMeta> {
        if self.meta & !meta_flags::ALL != 0 {
            return Err(CryptidError::InvalidAccountMeta(self.meta));
        }
        Ok(AccountMeta {
            pubkey: *accounts.get(self.key)?,
            is_signer: self.meta & meta_flags::IS_SIGNER != 0,
            is_writable: self.meta & meta_flags::IS_WRITABLE != 0,
        })
    }
}

/// An instruction whose addresses are replaced by accounts array indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionData {
    pub program_id: u8,
    pub accounts: Vec<AbbreviatedAccountMeta>,
    pub data: Vec<u8>,
}

impl InstructionData {
    /// Abbreviate `ix` against `accounts`. Every address must already be in
    /// the array; a miss means the array was built wrong.
    pub fn from_instruction(ix: &Instruction, accounts: &AccountsArray) -> CryptidResult<Self> {
        Ok(Self {
            program_id: accounts.index_of(&ix.program_id)?,
            accounts: ix
                .accounts
                .iter()
                .map(|meta| AbbreviatedAccountMeta::from_account_meta(meta, accounts))
                .collect::<CryptidResult<_>>()?,
            data: ix.data.clone(),
        })
    }

    pub fn to_instruction(&self, accounts: &AccountsArray) -> CryptidResult<Instruction> {
        Ok(Instruction {
            program_id: *accounts.get(self.program_id)?,
            accounts: self
                .accounts
                .iter()
                .map(|meta| meta.to_account_meta(accounts))
                .collect::<CryptidResult<_>>()?,
            data: self.data.clone(),
        })
    }

    /// Exact encoded length.
    pub fn encoded_len(&self) -> usize {
        1 + 4 + AbbreviatedAccountMeta::SIZE * self.accounts.len() + 4 + self.data.len()
    }

    pub fn write<B: BufMut>(&self, buf: &mut B) -> CryptidResult<()> {
        buf.put_u8(self.program_id);
        put_len(buf, self.accounts.len())?;
        for meta in &self.accounts {
            buf.put_u8(meta.key);
            buf.put_u8(meta.meta);
        }
        put_bytes(buf, &self.data)
    }

    pub fn read<B: Buf>(buf: &mut B) -> CryptidResult<Self> {
        let program_id = get_u8(buf)?;
        let count = get_len(buf)?;
        ensure_remaining(buf, count.saturating_mul(AbbreviatedAccountMeta::SIZE))?;
        let mut accounts = Vec::with_capacity(count);
        for _ in 0..count {
            accounts.push(AbbreviatedAccountMeta {
                key: buf.get_u8(),
                meta: buf.get_u8(),
            });
        }
        let data = get_bytes(buf)?;
        Ok(Self {
            program_id,
            accounts,
            data,
        })
    }

    pub fn to_bytes(&self) -> CryptidResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write(&mut out)?;
        Ok(out)
    }
}

/// Encode `ix` against `accounts`.
pub fn encode(ix: &Instruction, accounts: &AccountsArray) -> CryptidResult<Vec<u8>> {
    InstructionData::from_instruction(ix, accounts)?.to_bytes()
}

/// Decode exactly one instruction from `bytes` and resolve it against
/// `accounts`.
pub fn decode(bytes: &[u8], accounts: &AccountsArray) -> CryptidResult<Instruction> {
    let mut buf = bytes;
    let data = InstructionData::read(&mut buf)?;
    if buf.has_remaining() {
        return Err(CryptidError::TrailingData(buf.remaining()));
    }
    data.to_instruction(accounts)
}

/// Write a sequence of instructions with a u32 count prefix.
pub fn write_instructions<B: BufMut>(buf: &mut B, instructions: &[InstructionData]) -> CryptidResult<()> {
    put_len(buf, instructions.len())?;
    for ix in instructions {
        ix.write(buf)?;
    }
    Ok(())
}

pub fn read_instructions<B: Buf>(buf: &mut B) -> CryptidResult<Vec<InstructionData>> {
    let count = get_len(buf)?;
    // each instruction is at least 9 bytes; bound the allocation by input
    let mut out = Vec::with_capacity(count.min(buf.remaining() / 9));
    for _ in 0..count {
        out.push(InstructionData::read(buf)?);
    }
    Ok(out)
}

// Primitive readers and writers shared by the payload and account codecs.

pub(crate) fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> CryptidResult<()> {
    if buf.remaining() < needed {
        return Err(CryptidError::truncated(needed, buf.remaining()));
    }
    Ok(())
}

pub(crate) fn get_u8<B: Buf>(buf: &mut B) -> CryptidResult<u8> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8())
}

pub(crate) fn get_u16<B: Buf>(buf: &mut B) -> CryptidResult<u16> {
    ensure_remaining(buf, 2)?;
    Ok(buf.get_u16_le())
}

pub(crate) fn get_u32<B: Buf>(buf: &mut B) -> CryptidResult<u32> {
    ensure_remaining(buf, 4)?;
    Ok(buf.get_u32_le())
}

pub(crate) fn get_i64<B: Buf>(buf: &mut B) -> CryptidResult<i64> {
    ensure_remaining(buf, 8)?;
    Ok(buf.get_i64_le())
}

pub(crate) fn get_len<B: Buf>(buf: &mut B) -> CryptidResult<usize> {
    get_u32(buf).map(|n| n as usize)
}

pub(crate) fn get_bool<B: Buf>(buf: &mut B) -> CryptidResult<bool> {
    match get_u8(buf)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CryptidError::invalid_argument(format!("invalid bool byte {other}"))),
    }
}

pub(crate) fn get_pubkey<B: Buf>(buf: &mut B) -> CryptidResult<Pubkey> {
    ensure_remaining(buf, 32)?;
    let mut key = [0u8; 32];
    buf.copy_to_slice(&mut key);
    Ok(Pubkey::new_from_array(key))
}

pub(crate) fn get_bytes<B: Buf>(buf: &mut B) -> CryptidResult<Vec<u8>> {
    let len = get_len(buf)?;
    ensure_remaining(buf, len)?;
    let mut out = vec![0u8; len];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

pub(crate) fn get_pubkeys<B: Buf>(buf: &mut B) -> CryptidResult<Vec<Pubkey>> {
    let count = get_len(buf)?;
    ensure_remaining(buf, count.saturating_mul(32))?;
    (0..count).map(|_| get_pubkey(buf)).collect()
}

pub(crate) fn put_len<B: BufMut>(buf: &mut B, len: usize) -> CryptidResult<()> {
    let len = u32::try_from(len)
        .map_err(|_| CryptidError::invalid_argument(format!("sequence of {len} items exceeds u32")))?;
    buf.put_u32_le(len);
    Ok(())
}

pub(crate) fn put_bytes<B: BufMut>(buf: &mut B, bytes: &[u8]) -> CryptidResult<()> {
    put_len(buf, bytes.len())?;
    buf.put_slice(bytes);
    Ok(())
}

pub(crate) fn put_pubkeys<B: BufMut>(buf: &mut B, keys: &[Pubkey]) -> CryptidResult<()> {
    put_len(buf, keys.len())?;
    for key in keys {
        buf.put_slice(key.as_ref());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample() -> (Instruction, AccountsArray) {
        let program = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let ix = Instruction::new_with_bytes(
            program,
            &[9, 8, 7],
            vec![AccountMeta::new(a, true), AccountMeta::new_readonly(b, false)],
        );
        let arr = AccountsArray::from_instructions(std::slice::from_ref(&ix)).unwrap();
        (ix, arr)
    }

    #[test]
    fn known_layout() {
        let (ix, arr) = sample();
        let bytes = encode(&ix, &arr).unwrap();
        assert_eq!(
            bytes,
            vec![
                0, // program
                2, 0, 0, 0, // accounts len
                1, meta_flags::IS_SIGNER | meta_flags::IS_WRITABLE,
                2, 0,
                3, 0, 0, 0, // data len
                9, 8, 7,
            ]
        );
        assert_eq!(bytes.len(), InstructionData::from_instruction(&ix, &arr).unwrap().encoded_len());
    }

    #[test]
    fn decode_inverts_encode() {
        let (ix, arr) = sample();
        let bytes = encode(&ix, &arr).unwrap();
        assert_eq!(decode(&bytes, &arr).unwrap(), ix);
    }

    #[test]
    fn missing_program_id_is_reported() {
        let (ix, _) = sample();
        let arr = AccountsArray::from_keys(ix.accounts.iter().map(|m| m.pubkey).collect()).unwrap();
        assert_matches!(encode(&ix, &arr), Err(CryptidError::AccountNotInArray(k)) if k == ix.program_id);
    }

    #[test]
    fn declared_data_length_exceeding_input_is_truncation() {
        let (ix, arr) = sample();
        let mut bytes = encode(&ix, &arr).unwrap();
        // data length field sits after program (1) + len (4) + 2 metas (4)
        bytes[9..13].copy_from_slice(&1000u32.to_le_bytes());
        assert_matches!(
            decode(&bytes, &arr),
            Err(CryptidError::TruncatedData { needed: 1000, remaining: 3 })
        );
    }

    #[test]
    fn huge_account_count_is_truncation_not_allocation() {
        let bytes = [0u8, 0xff, 0xff, 0xff, 0xff];
        assert_matches!(
            decode(&bytes, &AccountsArray::new()),
            Err(CryptidError::TruncatedData { .. })
        );
    }

    #[test]
    fn index_past_array_is_out_of_bounds() {
        let (ix, arr) = sample();
        let mut bytes = encode(&ix, &arr).unwrap();
        bytes[7] = 42;
        assert_matches!(
            decode(&bytes, &arr),
            Err(CryptidError::IndexOutOfBounds { index: 42, len: 3 })
        );
    }

    #[test]
    fn unknown_meta_bits_rejected() {
        let (ix, arr) = sample();
        let mut bytes = encode(&ix, &arr).unwrap();
        bytes[6] = 0x80;
        assert_matches!(decode(&bytes, &arr), Err(CryptidError::InvalidAccountMeta(0x80)));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let (ix, arr) = sample();
        let mut bytes = encode(&ix, &arr).unwrap();
        bytes.push(0);
        assert_matches!(decode(&bytes, &arr), Err(CryptidError::TrailingData(1)));
    }

    #[test]
    fn empty_input_is_truncation() {
        assert_matches!(
            decode(&[], &AccountsArray::new()),
            Err(CryptidError::TruncatedData { needed: 1, remaining: 0 })
        );
    }
}
