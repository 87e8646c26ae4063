use crate::errors::SoliseumError;
use crate::events::ArenaInitialized;
use crate::state::{Arena, ArenaStatus};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;

pub const MAX_FEE_BPS: u16 = 1_000;
pub const REQUIRED_THRESHOLD: u8 = 2;

#[derive(Accounts)]
pub struct InitializeArena<'info> {
    #[account(
        init,
        payer = creator,
        space = 8 + Arena::LEN,
        seeds = [b"arena", creator.key().as_ref()],
        bump
    )]
    pub arena: Account<'info, Arena>,

    /// Vault PDA: holds staked lamports only (zero-length data) so the
    /// System Program will allow transfers out of it on claim.
    /// CHECK: validated by seeds; created with zero space in this instruction.
    #[account(mut, seeds = [b"vault", creator.key().as_ref()], bump)]
    pub vault: UncheckedAccount<'info>,

    #[account(mut)]
    pub creator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializeArena>,
    fee_bps: u16,
    oracles: [Pubkey; 3],
    threshold: u8,
) -> Result<()> {
    require!(fee_bps <= MAX_FEE_BPS, SoliseumError::FeeOutOfRange);
    require!(threshold == REQUIRED_THRESHOLD, SoliseumError::InvalidThreshold);
    require!(
        oracles[0] != oracles[1] && oracles[0] != oracles[2] && oracles[1] != oracles[2],
        SoliseumError::DuplicateOracle
    );

    let (vault_pubkey, vault_bump) = Pubkey::find_program_address(
        &[b"vault", ctx.accounts.creator.key().as_ref()],
        ctx.program_id,
    );
    require_keys_eq!(vault_pubkey, ctx.accounts.vault.key());

    if ctx.accounts.vault.lamports() == 0 {
        invoke_signed(
            &system_instruction::create_account(
                &ctx.accounts.creator.key(),
                &vault_pubkey,
                0,
                0,
                ctx.program_id,
            ),
            &[
                ctx.accounts.creator.to_account_info(),
                ctx.accounts.vault.to_account_info(),
                ctx.accounts.system_program.to_account_info(),
            ],
            &[&[b"vault", ctx.accounts.creator.key().as_ref(), &[vault_bump]]],
        )?;
    }

    let arena = &mut ctx.accounts.arena;
    arena.creator = ctx.accounts.creator.key();
    arena.oracles = oracles;
    arena.threshold = threshold;
    arena.status = ArenaStatus::Active;
    arena.set_winner(None);
    arena.fee_bps = fee_bps;
    arena.agent_a_pool = 0;
    arena.agent_b_pool = 0;
    arena.total_pool = 0;
    arena.settlement_nonce = 0;

    emit!(ArenaInitialized {
        arena: arena.key(),
        creator: arena.creator,
        oracles: arena.oracles,
        threshold: arena.threshold,
        fee_bps: arena.fee_bps,
    });

    Ok(())
}
