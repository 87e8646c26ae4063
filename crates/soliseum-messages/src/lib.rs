//! Canonical signing messages shared by the on-chain program (which
//! reconstructs them to check against Ed25519 precompile instructions) and
//! the oracle coordinator (which signs them). Both sides must agree on
//! these bytes exactly; this crate is the single place they're defined.

pub const SETTLE_PREFIX: &[u8] = b"soliseum:settle:";
pub const RESET_PREFIX: &[u8] = b"soliseum:reset:";
pub const UPDATE_ORACLES_PREFIX: &[u8] = b"soliseum:update_oracles:";

pub const SETTLE_MESSAGE_LEN: usize = SETTLE_PREFIX.len() + 32 + 1 + 8;
pub const RESET_MESSAGE_LEN: usize = RESET_PREFIX.len() + 32 + 8;
pub const UPDATE_ORACLES_MESSAGE_LEN: usize = UPDATE_ORACLES_PREFIX.len() + 32 + 32 * 3 + 8;

/// `"soliseum:settle:" || arena_id(32) || winner(1) || nonce(8)` (57 bytes).
pub fn settle_message(arena_id: &[u8; 32], winner: u8, nonce: u64) -> [u8; SETTLE_MESSAGE_LEN] {
    let mut out = [0u8; SETTLE_MESSAGE_LEN];
    let mut at = 0;
    out[at..at + SETTLE_PREFIX.len()].copy_from_slice(SETTLE_PREFIX);
    at += SETTLE_PREFIX.len();
    out[at..at + 32].copy_from_slice(arena_id);
    at += 32;
    out[at] = winner;
    at += 1;
    out[at..at + 8].copy_from_slice(&nonce.to_le_bytes());
    out
}

/// `"soliseum:reset:" || arena_id(32) || nonce(8)` (55 bytes).
pub fn reset_message(arena_id: &[u8; 32], nonce: u64) -> [u8; RESET_MESSAGE_LEN] {
    let mut out = [0u8; RESET_MESSAGE_LEN];
    let mut at = 0;
    out[at..at + RESET_PREFIX.len()].copy_from_slice(RESET_PREFIX);
    at += RESET_PREFIX.len();
    out[at..at + 32].copy_from_slice(arena_id);
    at += 32;
    out[at..at + 8].copy_from_slice(&nonce.to_le_bytes());
    out
}

/// Reserved, not wired into any instruction — see Non-goals (no oracle
/// rotation mid-settlement). Kept so the layout exists if that ever changes.
pub fn update_oracles_message(
    arena_id: &[u8; 32],
    oracles: &[[u8; 32]; 3],
    nonce: u64,
) -> [u8; UPDATE_ORACLES_MESSAGE_LEN] {
    let mut out = [0u8; UPDATE_ORACLES_MESSAGE_LEN];
    let mut at = 0;
    out[at..at + UPDATE_ORACLES_PREFIX.len()].copy_from_slice(UPDATE_ORACLES_PREFIX);
    at += UPDATE_ORACLES_PREFIX.len();
    out[at..at + 32].copy_from_slice(arena_id);
    at += 32;
    for oracle in oracles {
        out[at..at + 32].copy_from_slice(oracle);
        at += 32;
    }
    out[at..at + 8].copy_from_slice(&nonce.to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_message_is_57_bytes_and_round_trips_fields() {
        let arena_id = [7u8; 32];
        let msg = settle_message(&arena_id, 1, 42);
        assert_eq!(msg.len(), 57);
        assert_eq!(&msg[..16], SETTLE_PREFIX);
        assert_eq!(&msg[16..48], &arena_id);
        assert_eq!(msg[48], 1);
        assert_eq!(&msg[49..57], &42u64.to_le_bytes());
    }

    #[test]
    fn reset_message_is_55_bytes_and_round_trips_fields() {
        let arena_id = [9u8; 32];
        let msg = reset_message(&arena_id, 3);
        assert_eq!(msg.len(), 55);
        assert_eq!(&msg[..15], RESET_PREFIX);
        assert_eq!(&msg[15..47], &arena_id);
        assert_eq!(&msg[47..55], &3u64.to_le_bytes());
    }

    #[test]
    fn update_oracles_message_is_160_bytes() {
        let arena_id = [1u8; 32];
        let oracles = [[2u8; 32], [3u8; 32], [4u8; 32]];
        let msg = update_oracles_message(&arena_id, &oracles, 5);
        assert_eq!(msg.len(), 160);
        assert_eq!(&msg[24..56], &arena_id);
        assert_eq!(&msg[56..88], &oracles[0]);
        assert_eq!(&msg[88..120], &oracles[1]);
        assert_eq!(&msg[120..152], &oracles[2]);
        assert_eq!(&msg[152..160], &5u64.to_le_bytes());
    }

    #[test]
    fn distinct_nonces_produce_distinct_messages() {
        let arena_id = [0u8; 32];
        assert_ne!(settle_message(&arena_id, 0, 0), settle_message(&arena_id, 0, 1));
    }
}
