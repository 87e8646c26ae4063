use anchor_lang::prelude::*;

/// Arena lifecycle status.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq)]
pub enum ArenaStatus {
    Active,
    Settled,
}

impl Default for ArenaStatus {
    fn default() -> Self {
        ArenaStatus::Active
    }
}

/// One battle's stake market and its lifecycle state.
///
/// PDA seeds: `["arena", creator]`.
///
/// `winner` is split into `winner_tag` / `winner_val` (rather than a Borsh
/// `Option<u8>`) so the account's byte layout is fixed regardless of
/// lifecycle state: off-chain tooling parses this record by fixed byte
/// offset, and Borsh's `Option` encoding would otherwise shift every field
/// after it by one byte depending on whether a winner has been declared.
#[account]
pub struct Arena {
    pub creator: Pubkey,
    pub oracles: [Pubkey; 3],
    pub threshold: u8,
    pub status: ArenaStatus,
    pub winner_tag: u8,
    pub winner_val: u8,
    pub fee_bps: u16,
    pub agent_a_pool: u64,
    pub agent_b_pool: u64,
    pub total_pool: u64,
    pub settlement_nonce: u64,
}

impl Arena {
    // creator(32) + oracles(3*32=96) + threshold(1) + status(1)
    // + winner_tag(1) + winner_val(1) + fee_bps(2)
    // + agent_a_pool(8) + agent_b_pool(8) + total_pool(8) + settlement_nonce(8)
    pub const LEN: usize = 32 + 96 + 1 + 1 + 1 + 1 + 2 + 8 + 8 + 8 + 8;

    pub fn winner(&self) -> Option<u8> {
        if self.winner_tag == 0 {
            None
        } else {
            Some(self.winner_val)
        }
    }

    pub fn set_winner(&mut self, winner: Option<u8>) {
        match winner {
            None => {
                self.winner_tag = 0;
                self.winner_val = 0;
            }
            Some(value) => {
                self.winner_tag = 1;
                self.winner_val = value;
            }
        }
    }

    pub fn winning_pool(&self, winner: u8) -> u64 {
        if winner == 0 {
            self.agent_a_pool
        } else {
            self.agent_b_pool
        }
    }

    pub fn losing_pool(&self, winner: u8) -> u64 {
        if winner == 0 {
            self.agent_b_pool
        } else {
            self.agent_a_pool
        }
    }
}

/// One patron's contribution to one arena on one side.
///
/// PDA seeds: `["stake", arena, owner]` — the same PDA is reused across
/// every round an owner participates in, since a losing or never-claimed
/// stake is never closed. `opened_nonce` records the arena's
/// `settlement_nonce` at the moment this record was (re)opened, which is
/// the only way to tell "still accumulating this round" apart from "stale
/// leftovers from a round that was reset without ever being claimed" —
/// `claimed` alone can't do this, since a losing stake's owner is never
/// required to call `claim_reward` and a reset proceeds regardless of
/// outstanding claims. This is one field wider than the literal Stake
/// layout in the on-chain interface table; see `DESIGN.md`.
#[account]
pub struct Stake {
    pub owner: Pubkey,
    pub amount: u64,
    pub side: u8,
    pub claimed: bool,
    pub opened_nonce: u64,
}

impl Stake {
    pub const LEN: usize = 32 + 8 + 1 + 1 + 8;
}
