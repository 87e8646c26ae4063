//! Threshold Ed25519 signature verification via instruction introspection.
//!
//! The program does not implement Ed25519 verification itself — that would
//! be prohibitively expensive inside the BPF runtime. Instead it requires
//! the native Ed25519 program to have verified each claimed signature
//! earlier in the same transaction, and checks via the instructions sysvar
//! that those precompile instructions were built over exactly the pubkey,
//! message and signature the caller claims. A signature the precompile
//! didn't verify for this exact triple is indistinguishable from a missing
//! one.

use crate::errors::SoliseumError;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};

/// One (oracle_index, signature) pair as carried in instruction args.
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct SignatureEntry {
    pub oracle_index: u8,
    pub signature: [u8; 64],
}

const SIG_OFFSETS_LEN: usize = 14;
const CURRENT_IX_SENTINEL: u16 = u16::MAX;

struct Ed25519SignatureOffsets {
    signature_offset: u16,
    signature_instruction_index: u16,
    public_key_offset: u16,
    public_key_instruction_index: u16,
    message_data_offset: u16,
    message_data_size: u16,
    message_instruction_index: u16,
}

fn parse_offsets(entry: &[u8]) -> Option<Ed25519SignatureOffsets> {
    if entry.len() < SIG_OFFSETS_LEN {
        return None;
    }
    let read_u16 = |off: usize| u16::from_le_bytes([entry[off], entry[off + 1]]);
    Some(Ed25519SignatureOffsets {
        signature_offset: read_u16(0),
        signature_instruction_index: read_u16(2),
        public_key_offset: read_u16(4),
        public_key_instruction_index: read_u16(6),
        message_data_offset: read_u16(8),
        message_data_size: read_u16(10),
        message_instruction_index: read_u16(12),
    })
}

/// Resolves the byte slice `[offset, offset+len)` out of either the current
/// ed25519 instruction's own data (sentinel index) or another instruction in
/// the same transaction, fetched through the instructions sysvar.
fn resolve_slice<'a>(
    current_data: &'a [u8],
    instructions_sysvar: &AccountInfo,
    instruction_index: u16,
    offset: u16,
    len: usize,
) -> Result<std::borrow::Cow<'a, [u8]>> {
    if instruction_index == CURRENT_IX_SENTINEL {
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .ok_or(SoliseumError::InvalidSignature)?;
        let slice = current_data
            .get(start..end)
            .ok_or(SoliseumError::InvalidSignature)?;
        Ok(std::borrow::Cow::Borrowed(slice))
    } else {
        let other = load_instruction_at_checked(instruction_index as usize, instructions_sysvar)
            .map_err(|_| SoliseumError::InvalidSignature)?;
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .ok_or(SoliseumError::InvalidSignature)?;
        let slice = other
            .data
            .get(start..end)
            .ok_or(SoliseumError::InvalidSignature)?
            .to_vec();
        Ok(std::borrow::Cow::Owned(slice))
    }
}

/// Returns true iff some ed25519 precompile instruction earlier in this
/// transaction verified `signature` over `message` under `pubkey`.
fn precompile_verified(
    instructions_sysvar: &AccountInfo,
    pubkey: &Pubkey,
    message: &[u8],
    signature: &[u8; 64],
) -> Result<bool> {
    let current_index =
        load_current_index_checked(instructions_sysvar).map_err(|_| SoliseumError::InvalidSignature)?;

    for ix_index in 0..current_index {
        let ix = match load_instruction_at_checked(ix_index as usize, instructions_sysvar) {
            Ok(ix) => ix,
            Err(_) => continue,
        };
        if ix.program_id != ed25519_program::id() {
            continue;
        }
        let data = &ix.data;
        if data.len() < 2 {
            continue;
        }
        let num_signatures = data[0] as usize;
        let mut cursor = 2usize;
        for _ in 0..num_signatures {
            let entry = match data.get(cursor..cursor + SIG_OFFSETS_LEN) {
                Some(e) => e,
                None => break,
            };
            let offsets = match parse_offsets(entry) {
                Some(o) => o,
                None => break,
            };
            cursor += SIG_OFFSETS_LEN;

            let sig_slice = resolve_slice(
                data,
                instructions_sysvar,
                offsets.signature_instruction_index,
                offsets.signature_offset,
                64,
            );
            let pk_slice = resolve_slice(
                data,
                instructions_sysvar,
                offsets.public_key_instruction_index,
                offsets.public_key_offset,
                32,
            );
            let msg_slice = resolve_slice(
                data,
                instructions_sysvar,
                offsets.message_instruction_index,
                offsets.message_data_offset,
                offsets.message_data_size as usize,
            );

            let (sig_slice, pk_slice, msg_slice) = match (sig_slice, pk_slice, msg_slice) {
                (Ok(s), Ok(p), Ok(m)) => (s, p, m),
                _ => continue,
            };

            if sig_slice.as_ref() == signature.as_slice()
                && pk_slice.as_ref() == pubkey.as_ref()
                && msg_slice.as_ref() == message
            {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Verifies that `entries` carries at least `threshold` distinct, valid
/// oracle signatures over `message`, each checked against `oracles`.
///
/// Every entry must independently verify; a caller padding the list with a
/// bogus signature fails the whole call rather than being silently dropped,
/// matching the wire format's fixed `count` field.
pub fn verify_threshold(
    instructions_sysvar: &AccountInfo,
    oracles: &[Pubkey; 3],
    threshold: u8,
    message: &[u8],
    entries: &[SignatureEntry],
) -> Result<()> {
    validate_entry_shape(threshold, entries)?;

    for entry in entries {
        let idx = entry.oracle_index as usize;
        let verified = precompile_verified(
            instructions_sysvar,
            &oracles[idx],
            message,
            &entry.signature,
        )?;
        require!(verified, SoliseumError::InvalidSignature);
    }

    Ok(())
}

/// Count, range, and duplicate checks that don't need the instructions
/// sysvar — split out so they're unit-testable without a validator.
fn validate_entry_shape(threshold: u8, entries: &[SignatureEntry]) -> Result<()> {
    require!(
        entries.len() >= threshold as usize,
        SoliseumError::InsufficientSignatures
    );

    let mut seen = [false; 3];
    for entry in entries {
        let idx = entry.oracle_index as usize;
        require!(idx < 3, SoliseumError::OracleIndexOutOfRange);
        require!(!seen[idx], SoliseumError::DuplicateSigner);
        seen[idx] = true;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(oracle_index: u8) -> SignatureEntry {
        SignatureEntry {
            oracle_index,
            signature: [0u8; 64],
        }
    }

    #[test]
    fn rejects_fewer_than_threshold_entries() {
        let err = validate_entry_shape(2, &[entry(0)]).unwrap_err();
        assert_eq!(err.to_string(), SoliseumError::InsufficientSignatures.to_string());
    }

    #[test]
    fn rejects_duplicate_oracle_index() {
        let err = validate_entry_shape(2, &[entry(0), entry(0)]).unwrap_err();
        assert_eq!(err.to_string(), SoliseumError::DuplicateSigner.to_string());
    }

    #[test]
    fn rejects_out_of_range_oracle_index() {
        let err = validate_entry_shape(2, &[entry(0), entry(3)]).unwrap_err();
        assert_eq!(err.to_string(), SoliseumError::OracleIndexOutOfRange.to_string());
    }

    #[test]
    fn accepts_threshold_distinct_entries() {
        assert!(validate_entry_shape(2, &[entry(0), entry(1)]).is_ok());
    }

    #[test]
    fn accepts_more_than_threshold_distinct_entries() {
        assert!(validate_entry_shape(2, &[entry(0), entry(1), entry(2)]).is_ok());
    }
}
