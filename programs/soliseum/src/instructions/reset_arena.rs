use crate::errors::SoliseumError;
use crate::events::ArenaReset;
use crate::signature::{verify_threshold, SignatureEntry};
use crate::state::{Arena, ArenaStatus, Stake};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct ResetArena<'info> {
    #[account(
        mut,
        seeds = [b"arena", arena.creator.as_ref()],
        bump,
        constraint = arena.status == ArenaStatus::Settled @ SoliseumError::NotSettled
    )]
    pub arena: Account<'info, Arena>,

    /// Present (and must equal the arena's creator) only for a creator reset;
    /// pass the creator's own key as a plain signer otherwise too — the
    /// submitter decides the mode by whether `signatures` is empty.
    pub creator: Signer<'info>,

    /// CHECK: address-constrained to the instructions sysvar; unused on the
    /// creator-reset path.
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,
}

/// Verifies that `remaining_accounts` carries every winning-side stake for
/// this arena, all claimed. There is no on-chain set-membership proof for
/// "every PDA of this shape", so completeness is proven arithmetically: each
/// account's derivation is checked individually, and the sum of their
/// `amount` fields must equal the recorded winning pool exactly. A winning
/// stake omitted from the list would make the sum fall short and fail the
/// check; a non-winning or forged account can't be coerced to the right PDA.
fn assert_winning_side_fully_claimed(
    arena: &Account<Arena>,
    winner: u8,
    remaining_accounts: &[AccountInfo],
    program_id: &Pubkey,
) -> Result<()> {
    // A settled arena's `settlement_nonce` has already been advanced past
    // the round that just played out (settle_game increments it once),
    // so the round being verified here opened under `settlement_nonce - 1`.
    // Stake PDAs are reused across rounds, so a caller's own account may
    // still carry an unrelated, already-resolved round's data; those must
    // be skipped rather than folded into this round's completeness sum.
    let round_nonce = arena
        .settlement_nonce
        .checked_sub(1)
        .ok_or(SoliseumError::Overflow)?;
    let mut claimed_total: u64 = 0;
    for account_info in remaining_accounts {
        let data = account_info.try_borrow_data()?;
        let stake: Stake = Stake::try_deserialize(&mut &data[..])?;
        drop(data);

        let (expected_pda, _bump) = Pubkey::find_program_address(
            &[b"stake", arena.key().as_ref(), stake.owner.as_ref()],
            program_id,
        );
        require_keys_eq!(expected_pda, *account_info.key, SoliseumError::StakeNotFound);

        if stake.side != winner || stake.opened_nonce != round_nonce {
            continue;
        }
        require!(stake.claimed, SoliseumError::UnclaimedStakesPresent);
        claimed_total = claimed_total
            .checked_add(stake.amount)
            .ok_or(SoliseumError::Overflow)?;
    }

    require!(
        claimed_total == arena.winning_pool(winner),
        SoliseumError::UnclaimedStakesPresent
    );
    Ok(())
}

pub fn handler(ctx: Context<ResetArena>, signatures: Vec<SignatureEntry>) -> Result<()> {
    let arena = &ctx.accounts.arena;

    if signatures.is_empty() {
        // Creator reset.
        require_keys_eq!(
            ctx.accounts.creator.key(),
            arena.creator,
            SoliseumError::UnauthorizedCreator
        );
        let winner = arena.winner().ok_or(SoliseumError::NotSettled)?;
        assert_winning_side_fully_claimed(
            arena,
            winner,
            ctx.remaining_accounts,
            ctx.program_id,
        )?;
    } else {
        // Oracle-threshold reset: permitted regardless of outstanding claims.
        let message = soliseum_messages::reset_message(&arena.key().to_bytes(), arena.settlement_nonce);
        verify_threshold(
            &ctx.accounts.instructions_sysvar.to_account_info(),
            &arena.oracles,
            arena.threshold,
            &message,
            &signatures,
        )?;
    }

    let arena = &mut ctx.accounts.arena;
    arena.status = ArenaStatus::Active;
    arena.set_winner(None);
    arena.agent_a_pool = 0;
    arena.agent_b_pool = 0;
    arena.total_pool = 0;
    arena.settlement_nonce = arena
        .settlement_nonce
        .checked_add(1)
        .ok_or(SoliseumError::Overflow)?;

    emit!(ArenaReset {
        arena: arena.key(),
        settlement_nonce: arena.settlement_nonce,
    });

    Ok(())
}
