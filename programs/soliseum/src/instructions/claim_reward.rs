use crate::errors::SoliseumError;
use crate::events::RewardClaimed;
use crate::state::{Arena, ArenaStatus, Stake};
use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

pub const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Accounts)]
pub struct ClaimReward<'info> {
    #[account(
        mut,
        seeds = [b"arena", arena.creator.as_ref()],
        bump,
        constraint = arena.status == ArenaStatus::Settled @ SoliseumError::NotSettled
    )]
    pub arena: Account<'info, Arena>,

    /// CHECK: vault PDA, holds lamports only.
    #[account(mut, seeds = [b"vault", arena.creator.as_ref()], bump)]
    pub vault: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [b"stake", arena.key().as_ref(), patron.key().as_ref()],
        bump,
        constraint = stake.owner == patron.key() @ SoliseumError::StakeNotFound,
        constraint = !stake.claimed @ SoliseumError::AlreadyClaimed
    )]
    pub stake: Account<'info, Stake>,

    #[account(mut)]
    pub patron: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Pure payout arithmetic, factored out so it can be unit tested without a
/// validator. Mirrors spec.md §4.1's payout algorithm exactly.
pub fn compute_payout(
    caller_side: u8,
    winner: u8,
    caller_amount: u64,
    winning_pool: u64,
    losing_pool: u64,
    fee_bps: u16,
) -> Result<u64> {
    if caller_side != winner {
        return Ok(0);
    }
    require!(winning_pool > 0, SoliseumError::InvalidSettlement);

    let net_loser_pool = (losing_pool as u128)
        .checked_mul((BPS_DENOMINATOR - fee_bps as u64) as u128)
        .ok_or(SoliseumError::Overflow)?
        .checked_div(BPS_DENOMINATOR as u128)
        .ok_or(SoliseumError::Overflow)?;

    let reward = (caller_amount as u128)
        .checked_mul(net_loser_pool)
        .ok_or(SoliseumError::Overflow)?
        .checked_div(winning_pool as u128)
        .ok_or(SoliseumError::Overflow)?;

    let payout = (caller_amount as u128)
        .checked_add(reward)
        .ok_or(SoliseumError::Overflow)?;

    u64::try_from(payout).map_err(|_| SoliseumError::Overflow.into())
}

pub fn handler(ctx: Context<ClaimReward>) -> Result<()> {
    let arena = &ctx.accounts.arena;
    let stake = &ctx.accounts.stake;
    let winner = arena.winner().ok_or(SoliseumError::NotSettled)?;

    let payout = compute_payout(
        stake.side,
        winner,
        stake.amount,
        arena.winning_pool(winner),
        arena.losing_pool(winner),
        arena.fee_bps,
    )?;

    ctx.accounts.stake.claimed = true;

    if payout > 0 {
        let (_, vault_bump) = Pubkey::find_program_address(
            &[b"vault", arena.creator.as_ref()],
            ctx.program_id,
        );
        let vault_seeds: &[&[u8]] = &[b"vault", arena.creator.as_ref(), &[vault_bump]];
        let signer_seeds = &[vault_seeds];

        require!(
            ctx.accounts.vault.lamports() >= payout,
            SoliseumError::InsufficientVault
        );

        let cpi_accounts = Transfer {
            from: ctx.accounts.vault.to_account_info(),
            to: ctx.accounts.patron.to_account_info(),
        };
        let cpi_ctx = CpiContext::new_with_signer(
            ctx.accounts.system_program.to_account_info(),
            cpi_accounts,
            signer_seeds,
        );
        transfer(cpi_ctx, payout)?;
    }

    emit!(RewardClaimed {
        arena: ctx.accounts.arena.key(),
        owner: ctx.accounts.patron.key(),
        payout,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_receives_principal_plus_share_of_net_loser_pool() {
        // spec.md S1: A stakes 1 SOL on side 0, B stakes 2 SOL on side 1, fee 250 bps.
        let payout = compute_payout(0, 0, 1_000_000_000, 1_000_000_000, 2_000_000_000, 250)
            .unwrap();
        assert_eq!(payout, 2_950_000_000);
    }

    #[test]
    fn loser_receives_zero() {
        let payout = compute_payout(1, 0, 2_000_000_000, 1_000_000_000, 2_000_000_000, 250)
            .unwrap();
        assert_eq!(payout, 0);
    }

    #[test]
    fn zero_loser_pool_returns_exact_principal() {
        // spec.md S5.
        let payout = compute_payout(0, 0, 3_000_000_000, 3_000_000_000, 0, 250).unwrap();
        assert_eq!(payout, 3_000_000_000);
    }

    #[test]
    fn rounding_truncates_in_the_vaults_favor() {
        // winning_pool doesn't evenly divide net_loser_pool: remainder stays in vault.
        let payout = compute_payout(0, 0, 1, 3, 10, 0).unwrap();
        // net_loser_pool = 10, reward = 1*10/3 = 3 (not 3.33)
        assert_eq!(payout, 1 + 3);
    }

    #[test]
    fn fee_bps_of_zero_pays_out_full_net_loser_pool() {
        let payout = compute_payout(0, 0, 1_000_000_000, 1_000_000_000, 500_000_000, 0).unwrap();
        assert_eq!(payout, 1_500_000_000);
    }

    #[test]
    fn fee_bps_at_max_retains_ten_percent_of_loser_pool() {
        let payout = compute_payout(0, 0, 1_000_000_000, 1_000_000_000, 1_000_000_000, 1000).unwrap();
        assert_eq!(payout, 1_000_000_000 + 900_000_000);
    }
}
