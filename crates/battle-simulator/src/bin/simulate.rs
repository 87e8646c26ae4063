//! Stand-alone runner for `battle-simulator`, useful during development
//! without spinning up the oracle coordinator.

use battle_simulator::{Agent, BattleEvent, BattleMode, Descriptor, Simulator};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    TradingBlitz,
    QuickChess,
    CodeWars,
}

impl From<ModeArg> for BattleMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::TradingBlitz => BattleMode::TradingBlitz,
            ModeArg::QuickChess => BattleMode::QuickChess,
            ModeArg::CodeWars => BattleMode::CodeWars,
        }
    }
}

#[derive(Parser)]
#[command(name = "simulate", about = "Run one deterministic Soliseum battle")]
struct Cli {
    #[arg(long, value_enum, default_value = "quick-chess")]
    mode: ModeArg,

    #[arg(long, default_value = "Agent A")]
    agent_a: String,

    #[arg(long, default_value = "Agent B")]
    agent_b: String,

    #[arg(long)]
    win_rate_a: Option<f64>,

    #[arg(long)]
    win_rate_b: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    let descriptor = Descriptor {
        mode: cli.mode.into(),
        agent_a: Agent { name: cli.agent_a, win_rate: cli.win_rate_a },
        agent_b: Agent { name: cli.agent_b, win_rate: cli.win_rate_b },
        seed: cli.seed,
    };

    for event in Simulator::new(descriptor).run() {
        match event {
            BattleEvent::Progress(entry) => {
                println!(
                    "[t={}] agent {} {:?}: {}",
                    entry.time, entry.agent, entry.kind, entry.message
                );
            }
            BattleEvent::Terminal { winner } => {
                println!("winner: agent {winner}");
            }
        }
    }
}
