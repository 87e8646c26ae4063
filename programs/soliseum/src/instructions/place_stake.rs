use crate::errors::SoliseumError;
use crate::events::StakePlaced;
use crate::state::{Arena, ArenaStatus, Stake};
use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

#[derive(Accounts)]
#[instruction(amount: u64, side: u8)]
pub struct PlaceStake<'info> {
    #[account(
        mut,
        seeds = [b"arena", arena.creator.as_ref()],
        bump,
        constraint = arena.status == ArenaStatus::Active @ SoliseumError::NotActive
    )]
    pub arena: Account<'info, Arena>,

    /// CHECK: vault PDA, holds lamports only.
    #[account(mut, seeds = [b"vault", arena.creator.as_ref()], bump)]
    pub vault: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = patron,
        space = 8 + Stake::LEN,
        seeds = [b"stake", arena.key().as_ref(), patron.key().as_ref()],
        bump
    )]
    pub stake: Account<'info, Stake>,

    #[account(mut)]
    pub patron: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<PlaceStake>, amount: u64, side: u8) -> Result<()> {
    require!(amount > 0, SoliseumError::ZeroAmount);
    require!(side <= 1, SoliseumError::InvalidSide);

    let arena_nonce = ctx.accounts.arena.settlement_nonce;
    let stake = &mut ctx.accounts.stake;
    let is_new_account = stake.owner == Pubkey::default();
    // A stake record survives `reset_arena` unclosed whether or not it was
    // ever claimed — a losing stake's owner has no obligation to claim it,
    // and an oracle reset proceeds regardless of outstanding claims. So
    // `claimed` can't tell "still this round" apart from "stale leftovers
    // from a round that got reset". `opened_nonce` can: it's pinned to the
    // arena's nonce at the moment this PDA was last (re)opened, and the
    // nonce only changes across a settle/reset boundary, so it stays equal
    // to the current nonce for every deposit within one round and goes
    // stale the instant the round turns over.
    let starts_fresh_round = is_new_account || stake.opened_nonce != arena_nonce;

    if starts_fresh_round {
        stake.owner = ctx.accounts.patron.key();
        stake.side = side;
        stake.amount = 0;
        stake.claimed = false;
        stake.opened_nonce = arena_nonce;
    } else {
        require!(stake.side == side, SoliseumError::SideMismatch);
    }

    require!(
        ctx.accounts.patron.lamports() >= amount,
        SoliseumError::InsufficientFunds
    );

    let cpi_accounts = Transfer {
        from: ctx.accounts.patron.to_account_info(),
        to: ctx.accounts.vault.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.system_program.to_account_info(), cpi_accounts);
    transfer(cpi_ctx, amount)?;

    stake.amount = stake
        .amount
        .checked_add(amount)
        .ok_or(SoliseumError::Overflow)?;

    let arena = &mut ctx.accounts.arena;
    arena.total_pool = arena
        .total_pool
        .checked_add(amount)
        .ok_or(SoliseumError::Overflow)?;
    if side == 0 {
        arena.agent_a_pool = arena
            .agent_a_pool
            .checked_add(amount)
            .ok_or(SoliseumError::Overflow)?;
    } else {
        arena.agent_b_pool = arena
            .agent_b_pool
            .checked_add(amount)
            .ok_or(SoliseumError::Overflow)?;
    }

    emit!(StakePlaced {
        arena: arena.key(),
        owner: stake.owner,
        side,
        amount,
        stake_total: stake.amount,
    });

    Ok(())
}
