use anchor_lang::prelude::*;

#[event]
pub struct ArenaInitialized {
    pub arena: Pubkey,
    pub creator: Pubkey,
    pub oracles: [Pubkey; 3],
    pub threshold: u8,
    pub fee_bps: u16,
}

#[event]
pub struct StakePlaced {
    pub arena: Pubkey,
    pub owner: Pubkey,
    pub side: u8,
    pub amount: u64,
    pub stake_total: u64,
}

#[event]
pub struct ArenaSettled {
    pub arena: Pubkey,
    pub winner: u8,
    pub settlement_nonce: u64,
}

#[event]
pub struct RewardClaimed {
    pub arena: Pubkey,
    pub owner: Pubkey,
    pub payout: u64,
}

#[event]
pub struct ArenaReset {
    pub arena: Pubkey,
    pub settlement_nonce: u64,
}
