//! Deterministic battle outcome and progress-event generator.
//!
//! The simulator is a pure function of its descriptor and seed: the same
//! inputs always produce the same event sequence and the same winner. The
//! oracle coordinator treats it as a black box that eventually yields a
//! terminal winner; it never inspects the progress events.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleMode {
    TradingBlitz,
    QuickChess,
    CodeWars,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    /// Relative win rate used only to bias the winner draw; absent agents
    /// fall back to an even 0.5 split against the opponent.
    pub win_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub mode: BattleMode,
    pub agent_a: Agent,
    pub agent_b: Agent,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Info,
    Action,
    Milestone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub time: u32,
    pub agent: u8,
    pub message: String,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BattleEvent {
    Progress(ProgressEntry),
    Terminal { winner: u8 },
}

/// `p = win_rate_a / (win_rate_a + win_rate_b)`, falling back to 0.5 when
/// either rate is absent or their sum is zero.
pub fn win_probability_a(agent_a: &Agent, agent_b: &Agent) -> f64 {
    match (agent_a.win_rate, agent_b.win_rate) {
        (Some(a), Some(b)) if a + b > 0.0 => a / (a + b),
        _ => 0.5,
    }
}

/// FNV-1a, used only to turn a descriptor into a deterministic seed when the
/// caller doesn't supply one. Not cryptographic; determinism is the only
/// property that matters here.
fn fallback_seed(descriptor: &Descriptor) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    let mode_tag: u8 = match descriptor.mode {
        BattleMode::TradingBlitz => 0,
        BattleMode::QuickChess => 1,
        BattleMode::CodeWars => 2,
    };
    for byte in descriptor
        .agent_a
        .name
        .bytes()
        .chain(descriptor.agent_b.name.bytes())
        .chain(std::iter::once(mode_tag))
    {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn mode_vocabulary(mode: BattleMode) -> &'static [&'static str] {
    match mode {
        BattleMode::TradingBlitz => &[
            "opens a long position",
            "takes profit on a swing trade",
            "gets stopped out",
            "rotates into a new pair",
            "widens the spread lead",
        ],
        BattleMode::QuickChess => &[
            "develops a knight",
            "castles kingside",
            "sacrifices a pawn for tempo",
            "forks the rooks",
            "walks into a pin",
        ],
        BattleMode::CodeWars => &[
            "ships a passing test suite",
            "refactors the hot path",
            "introduces a regression",
            "wins the benchmark round",
            "patches a flaky test",
        ],
    }
}

/// Lazy, restartable producer of one battle's event sequence. Constructing a
/// fresh `Simulator` from the same descriptor reproduces the exact same
/// sequence; there is no hidden mutable global.
pub struct Simulator {
    descriptor: Descriptor,
}

impl Simulator {
    pub fn new(descriptor: Descriptor) -> Self {
        Self { descriptor }
    }

    pub fn run(self) -> SimulatorIter {
        let seed = self.descriptor.seed.unwrap_or_else(|| fallback_seed(&self.descriptor));
        SimulatorIter {
            rng: ChaCha8Rng::seed_from_u64(seed),
            descriptor: self.descriptor,
            emitted: 0,
            rounds: 6,
            time: 0,
            terminal_emitted: false,
        }
    }
}

pub struct SimulatorIter {
    rng: ChaCha8Rng,
    descriptor: Descriptor,
    emitted: u32,
    rounds: u32,
    time: u32,
    terminal_emitted: bool,
}

impl Iterator for SimulatorIter {
    type Item = BattleEvent;

    fn next(&mut self) -> Option<BattleEvent> {
        if self.emitted < self.rounds {
            let vocabulary = mode_vocabulary(self.descriptor.mode);
            let agent = self.rng.gen_range(0..2u8);
            let phrase = vocabulary[self.rng.gen_range(0..vocabulary.len())];
            let kind = if self.emitted + 1 == self.rounds {
                EventKind::Milestone
            } else {
                EventKind::Action
            };
            self.time += self.rng.gen_range(1..5);
            self.emitted += 1;

            let agent_name = if agent == 0 {
                &self.descriptor.agent_a.name
            } else {
                &self.descriptor.agent_b.name
            };
            return Some(BattleEvent::Progress(ProgressEntry {
                time: self.time,
                agent,
                message: format!("{agent_name} {phrase}"),
                kind,
            }));
        }

        if !self.terminal_emitted {
            self.terminal_emitted = true;
            let p_a = win_probability_a(&self.descriptor.agent_a, &self.descriptor.agent_b);
            let winner = if self.rng.gen_bool(p_a) { 0 } else { 1 };
            return Some(BattleEvent::Terminal { winner });
        }

        None
    }
}

/// Convenience: run a descriptor to completion and return only the winner,
/// which is all the oracle coordinator actually commits to.
pub fn terminal_winner(descriptor: Descriptor) -> u8 {
    Simulator::new(descriptor)
        .run()
        .find_map(|event| match event {
            BattleEvent::Terminal { winner } => Some(winner),
            _ => None,
        })
        .expect("simulator always terminates with a winner")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(seed: Option<u64>) -> Descriptor {
        Descriptor {
            mode: BattleMode::QuickChess,
            agent_a: Agent { name: "Alpha".into(), win_rate: Some(0.7) },
            agent_b: Agent { name: "Beta".into(), win_rate: Some(0.3) },
            seed,
        }
    }

    #[test]
    fn same_descriptor_and_seed_produce_identical_sequences() {
        let events_1: Vec<_> = Simulator::new(descriptor(Some(42))).run().collect();
        let events_2: Vec<_> = Simulator::new(descriptor(Some(42))).run().collect();
        assert_eq!(
            format!("{events_1:?}"),
            format!("{events_2:?}"),
            "identical descriptor + seed must reproduce the exact same run"
        );
    }

    #[test]
    fn different_seeds_can_diverge() {
        let winner_1 = terminal_winner(descriptor(Some(1)));
        let winner_2 = terminal_winner(descriptor(Some(2)));
        let winner_3 = terminal_winner(descriptor(Some(3)));
        // Not a strict assertion on any one seed, just that the draw isn't
        // pinned to a single constant winner regardless of seed.
        assert!([winner_1, winner_2, winner_3].iter().any(|w| *w == 0));
    }

    #[test]
    fn sequence_ends_in_exactly_one_terminal_event() {
        let events: Vec<_> = Simulator::new(descriptor(Some(7))).run().collect();
        let terminal_count = events
            .iter()
            .filter(|e| matches!(e, BattleEvent::Terminal { .. }))
            .count();
        assert_eq!(terminal_count, 1);
        assert!(matches!(events.last(), Some(BattleEvent::Terminal { .. })));
    }

    #[test]
    fn win_probability_falls_back_to_half_when_rates_absent() {
        let a = Agent { name: "A".into(), win_rate: None };
        let b = Agent { name: "B".into(), win_rate: None };
        assert_eq!(win_probability_a(&a, &b), 0.5);
    }

    #[test]
    fn win_probability_uses_relative_rates_when_present() {
        let a = Agent { name: "A".into(), win_rate: Some(3.0) };
        let b = Agent { name: "B".into(), win_rate: Some(1.0) };
        assert_eq!(win_probability_a(&a, &b), 0.75);
    }

    #[test]
    fn missing_seed_is_still_deterministic_for_the_same_descriptor() {
        let winner_1 = terminal_winner(descriptor(None));
        let winner_2 = terminal_winner(descriptor(None));
        assert_eq!(winner_1, winner_2);
    }
}
