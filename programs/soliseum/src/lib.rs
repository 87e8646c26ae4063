// Silence unexpected_cfgs from Anchor/solana_program macros (they use cfg values we don't declare)
#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod signature;
pub mod state;

use instructions::*;
use signature::SignatureEntry;

declare_id!("DSabgEbjSc4ZYGL8ZkCoFiE9NFZgF1vGRmrsFFkBZiXz");

#[program]
pub mod soliseum {
    use super::*;

    /// Create an arena backed by a fresh vault and a 2-of-3 oracle committee.
    pub fn initialize(
        ctx: Context<InitializeArena>,
        fee_bps: u16,
        oracles: [Pubkey; 3],
        threshold: u8,
    ) -> Result<()> {
        initialize_handler(ctx, fee_bps, oracles, threshold)
    }

    /// Stake on a side. Additive if the caller already holds a stake on the
    /// same side in this arena's current round.
    pub fn place_stake(ctx: Context<PlaceStake>, amount: u64, side: u8) -> Result<()> {
        place_stake_handler(ctx, amount, side)
    }

    /// Commit the battle's winner under a 2-of-3 oracle threshold signature,
    /// verified via Ed25519 precompile instruction introspection.
    pub fn settle_game(
        ctx: Context<SettleGame>,
        winner: u8,
        signatures: Vec<SignatureEntry>,
    ) -> Result<()> {
        settle_game_handler(ctx, winner, signatures)
    }

    /// Pay out a settled stake's pari-mutuel share, or mark a losing stake
    /// claimed with a zero payout.
    pub fn claim_reward(ctx: Context<ClaimReward>) -> Result<()> {
        claim_reward_handler(ctx)
    }

    /// Return a settled arena to Active. Pass an empty `signatures` for a
    /// creator reset (only valid once every winning stake is claimed), or a
    /// 2-of-3 oracle signature set for an unconditional oracle reset.
    pub fn reset_arena(ctx: Context<ResetArena>, signatures: Vec<SignatureEntry>) -> Result<()> {
        reset_arena_handler(ctx, signatures)
    }
}
