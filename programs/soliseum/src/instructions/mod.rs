pub mod claim_reward;
pub mod initialize;
pub mod place_stake;
pub mod reset_arena;
pub mod settle_game;

pub use claim_reward::{ClaimReward, handler as claim_reward_handler};
pub use initialize::{InitializeArena, handler as initialize_handler};
pub use place_stake::{PlaceStake, handler as place_stake_handler};
pub use reset_arena::{ResetArena, handler as reset_arena_handler};
pub use settle_game::{SettleGame, handler as settle_game_handler};

pub use claim_reward::*;
pub use initialize::*;
pub use place_stake::*;
pub use reset_arena::*;
pub use settle_game::*;
