use crate::errors::SoliseumError;
use crate::events::ArenaSettled;
use crate::signature::{verify_threshold, SignatureEntry};
use crate::state::{Arena, ArenaStatus};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct SettleGame<'info> {
    #[account(
        mut,
        seeds = [b"arena", arena.creator.as_ref()],
        bump,
        constraint = arena.status == ArenaStatus::Active @ SoliseumError::NotActive
    )]
    pub arena: Account<'info, Arena>,

    /// CHECK: address-constrained to the instructions sysvar.
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,
}

pub fn handler(ctx: Context<SettleGame>, winner: u8, signatures: Vec<SignatureEntry>) -> Result<()> {
    require!(winner <= 1, SoliseumError::InvalidSide);

    let arena = &ctx.accounts.arena;
    require!(
        arena.threshold == 2,
        SoliseumError::InvalidThreshold
    );
    require!(
        arena.winning_pool(winner) > 0,
        SoliseumError::InvalidSettlement
    );

    let message = soliseum_messages::settle_message(
        &arena.key().to_bytes(),
        winner,
        arena.settlement_nonce,
    );
    verify_threshold(
        &ctx.accounts.instructions_sysvar.to_account_info(),
        &arena.oracles,
        arena.threshold,
        &message,
        &signatures,
    )?;

    let arena = &mut ctx.accounts.arena;
    arena.status = ArenaStatus::Settled;
    arena.set_winner(Some(winner));
    arena.settlement_nonce = arena
        .settlement_nonce
        .checked_add(1)
        .ok_or(SoliseumError::Overflow)?;

    emit!(ArenaSettled {
        arena: arena.key(),
        winner,
        settlement_nonce: arena.settlement_nonce,
    });

    Ok(())
}
