//! `oracle-node`: runs one oracle's peer-signing server, or performs a
//! one-shot settlement submission.

mod config;
mod error;
mod rpc;
mod server;
mod signer;
mod submit;

use battle_simulator::{Agent, BattleMode, Descriptor};
use clap::{Parser, Subcommand};
use config::NodeConfig;
use error::CoordinatorError;
use signer::OracleSigner;
use solana_client::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "oracle-node")]
#[command(about = "Soliseum oracle coordinator node", long_about = None)]
struct Cli {
    #[arg(long)]
    index: u8,

    #[arg(long)]
    key: Option<PathBuf>,

    #[arg(long, value_delimiter = ',')]
    peers: Vec<String>,

    #[arg(long)]
    rpc: Option<String>,

    #[arg(long)]
    listen: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot submitter: collects threshold signatures and settles an arena.
    ///
    /// The winner isn't taken on the command line — it's derived by running
    /// the battle simulator against the same descriptor the match was
    /// announced under, so the value being signed is always a simulator
    /// output, never operator discretion.
    Settle {
        #[arg(long)]
        program_id: String,
        #[arg(long)]
        arena: String,
        #[arg(long)]
        payer: PathBuf,
        /// One of `trading-blitz`, `quick-chess`, `code-wars`.
        #[arg(long)]
        mode: String,
        #[arg(long)]
        agent_a: String,
        #[arg(long)]
        agent_a_win_rate: Option<f64>,
        #[arg(long)]
        agent_b: String,
        #[arg(long)]
        agent_b_win_rate: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_battle_mode(s: &str) -> anyhow::Result<BattleMode> {
    match s {
        "trading-blitz" => Ok(BattleMode::TradingBlitz),
        "quick-chess" => Ok(BattleMode::QuickChess),
        "code-wars" => Ok(BattleMode::CodeWars),
        other => Err(anyhow::anyhow!(
            "unknown battle mode {other:?}, expected one of trading-blitz, quick-chess, code-wars"
        )),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(err) => {
            error!(error = %err, "oracle-node exited with an error");
            match err.downcast_ref::<CoordinatorError>() {
                Some(coordinator_err) => coordinator_err.exit_code(),
                None => 64,
            }
        }
    };
    std::process::exit(exit_code);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = NodeConfig::resolve(cli.index, cli.key.clone(), cli.peers.clone(), cli.rpc.clone(), cli.listen.clone())?;

    match cli.command {
        None => run_server(config).await,
        Some(Commands::Settle {
            program_id,
            arena,
            payer,
            mode,
            agent_a,
            agent_a_win_rate,
            agent_b,
            agent_b_win_rate,
            seed,
        }) => {
            let descriptor = Descriptor {
                mode: parse_battle_mode(&mode)?,
                agent_a: Agent { name: agent_a, win_rate: agent_a_win_rate },
                agent_b: Agent { name: agent_b, win_rate: agent_b_win_rate },
                seed,
            };
            run_settle(config, &program_id, &arena, descriptor, &payer).await
        }
    }
}

async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    let signer = OracleSigner::load(&config.key_path)?;
    let rpc = RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed());
    let listen_addr = config.listen_addr.clone();

    info!(oracle_index = config.oracle_index, %listen_addr, "starting oracle-node server");
    let state = Arc::new(server::AppState { config, signer, rpc });
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_settle(
    config: NodeConfig,
    program_id: &str,
    arena: &str,
    descriptor: Descriptor,
    payer_path: &PathBuf,
) -> anyhow::Result<()> {
    let signer = OracleSigner::load(&config.key_path)?;
    let rpc = RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed());
    let program_id = submit::program_id_from_str(program_id)?;
    let arena = submit::arena_from_str(arena)?;
    submit::require_nonempty(&config.peers)?;

    let arena_state = rpc::fetch_arena(&rpc, &arena)
        .map_err(|e| CoordinatorError::SubmissionFailed(format!("fetching arena state: {e}")))?;
    let nonce = arena_state.settlement_nonce;
    let winner = battle_simulator::terminal_winner(descriptor);

    info!(%arena, winner, nonce, "collecting settlement signatures");
    let signatures = submit::collect_settlement_threshold(
        &config,
        &signer,
        &arena_state.oracles,
        &arena,
        winner,
        nonce,
    )
    .await?;

    let payer = solana_sdk::signature::read_keypair_file(payer_path).map_err(|e| {
        CoordinatorError::SubmissionFailed(format!(
            "reading payer keypair at {}: {e}",
            payer_path.display()
        ))
    })?;

    submit::submit_settlement(
        &rpc,
        &payer,
        &program_id,
        &arena,
        &arena_state.oracles,
        winner,
        nonce,
        signatures,
    )
    .await?;

    info!(%arena, winner, "settlement submitted");
    Ok(())
}
