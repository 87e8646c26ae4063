//! Arena account fetching and decoding.
//!
//! The coordinator parses Arena accounts by the fixed byte offsets the
//! program itself commits to (see `soliseum::state::Arena`), rather than
//! pulling in the full `anchor-lang` IDL machinery for a read-only client
//! that only ever needs five fields off one account type.

use anyhow::{anyhow, Context, Result};
use solana_client::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;

const DISCRIMINATOR_LEN: usize = 8;
const OFFSET_CREATOR: usize = DISCRIMINATOR_LEN;
const OFFSET_ORACLES: usize = OFFSET_CREATOR + 32;
const OFFSET_THRESHOLD: usize = OFFSET_ORACLES + 96;
const OFFSET_STATUS: usize = OFFSET_THRESHOLD + 1;
const OFFSET_WINNER_TAG: usize = OFFSET_STATUS + 1;
const OFFSET_WINNER_VAL: usize = OFFSET_WINNER_TAG + 1;
const OFFSET_FEE_BPS: usize = OFFSET_WINNER_VAL + 1;
const OFFSET_AGENT_A_POOL: usize = OFFSET_FEE_BPS + 2;
const OFFSET_AGENT_B_POOL: usize = OFFSET_AGENT_A_POOL + 8;
const OFFSET_TOTAL_POOL: usize = OFFSET_AGENT_B_POOL + 8;
const OFFSET_SETTLEMENT_NONCE: usize = OFFSET_TOTAL_POOL + 8;
const ARENA_ACCOUNT_LEN: usize = OFFSET_SETTLEMENT_NONCE + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaStatus {
    Active,
    Settled,
}

#[derive(Debug, Clone)]
pub struct ArenaView {
    pub creator: Pubkey,
    pub oracles: [Pubkey; 3],
    pub threshold: u8,
    pub status: ArenaStatus,
    pub winner: Option<u8>,
    pub fee_bps: u16,
    pub agent_a_pool: u64,
    pub agent_b_pool: u64,
    pub total_pool: u64,
    pub settlement_nonce: u64,
}

impl ArenaView {
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < ARENA_ACCOUNT_LEN {
            return Err(anyhow!(
                "arena account too short: expected at least {ARENA_ACCOUNT_LEN} bytes, got {}",
                data.len()
            ));
        }

        let read_pubkey = |at: usize| Pubkey::new_from_array(data[at..at + 32].try_into().unwrap());
        let read_u16 = |at: usize| u16::from_le_bytes(data[at..at + 2].try_into().unwrap());
        let read_u64 = |at: usize| u64::from_le_bytes(data[at..at + 8].try_into().unwrap());

        let oracles = [
            read_pubkey(OFFSET_ORACLES),
            read_pubkey(OFFSET_ORACLES + 32),
            read_pubkey(OFFSET_ORACLES + 64),
        ];

        let status = match data[OFFSET_STATUS] {
            0 => ArenaStatus::Active,
            1 => ArenaStatus::Settled,
            other => return Err(anyhow!("unrecognized arena status discriminant {other}")),
        };

        let winner = match data[OFFSET_WINNER_TAG] {
            0 => None,
            1 => Some(data[OFFSET_WINNER_VAL]),
            other => return Err(anyhow!("unrecognized winner tag {other}")),
        };

        Ok(Self {
            creator: read_pubkey(OFFSET_CREATOR),
            oracles,
            threshold: data[OFFSET_THRESHOLD],
            status,
            winner,
            fee_bps: read_u16(OFFSET_FEE_BPS),
            agent_a_pool: read_u64(OFFSET_AGENT_A_POOL),
            agent_b_pool: read_u64(OFFSET_AGENT_B_POOL),
            total_pool: read_u64(OFFSET_TOTAL_POOL),
            settlement_nonce: read_u64(OFFSET_SETTLEMENT_NONCE),
        })
    }
}

pub fn fetch_arena(rpc: &RpcClient, arena: &Pubkey) -> Result<ArenaView> {
    let account = rpc
        .get_account(arena)
        .with_context(|| format!("fetching arena account {arena}"))?;
    ArenaView::decode(&account.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(winner: Option<u8>, nonce: u64) -> Vec<u8> {
        let mut data = vec![0u8; ARENA_ACCOUNT_LEN];
        data[OFFSET_THRESHOLD] = 2;
        data[OFFSET_STATUS] = 1;
        match winner {
            None => data[OFFSET_WINNER_TAG] = 0,
            Some(value) => {
                data[OFFSET_WINNER_TAG] = 1;
                data[OFFSET_WINNER_VAL] = value;
            }
        }
        data[OFFSET_FEE_BPS..OFFSET_FEE_BPS + 2].copy_from_slice(&250u16.to_le_bytes());
        data[OFFSET_SETTLEMENT_NONCE..OFFSET_SETTLEMENT_NONCE + 8]
            .copy_from_slice(&nonce.to_le_bytes());
        data
    }

    #[test]
    fn decodes_settled_arena_with_declared_winner() {
        let data = encode(Some(1), 4);
        let arena = ArenaView::decode(&data).unwrap();
        assert_eq!(arena.status, ArenaStatus::Settled);
        assert_eq!(arena.winner, Some(1));
        assert_eq!(arena.fee_bps, 250);
        assert_eq!(arena.settlement_nonce, 4);
    }

    #[test]
    fn decodes_no_winner_as_none() {
        let data = encode(None, 0);
        let arena = ArenaView::decode(&data).unwrap();
        assert_eq!(arena.winner, None);
    }

    #[test]
    fn rejects_truncated_account_data() {
        let data = vec![0u8; 10];
        assert!(ArenaView::decode(&data).is_err());
    }
}
