//! Peer-facing HTTP surface: `POST /sign/settlement` and `POST /sign/reset`.
//!
//! A request is honored only from a caller whose claimed oracle index is one
//! of this node's configured peers, and only for the nonce currently on
//! chain — a signature for a stale nonce is worthless to the caller and the
//! program would reject it anyway, so the responder refuses to produce one.

use crate::config::NodeConfig;
use crate::rpc::ArenaStatus;
use crate::signer::OracleSigner;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use solana_client::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub struct AppState {
    pub config: NodeConfig,
    pub signer: OracleSigner,
    pub rpc: RpcClient,
}

#[derive(Serialize, Deserialize)]
pub struct SignSettlementRequest {
    pub caller_index: u8,
    pub arena: String,
    pub winner: u8,
    pub nonce: u64,
}

#[derive(Serialize, Deserialize)]
pub struct SignResetRequest {
    pub caller_index: u8,
    pub arena: String,
    pub nonce: u64,
}

#[derive(Serialize, Deserialize)]
pub struct SignResponse {
    pub oracle_index: u8,
    pub signature: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn authenticate(state: &AppState, caller_index: u8) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let known = state.config.peers.iter().any(|p| p.oracle_index == caller_index);
    if known {
        Ok(())
    } else {
        warn!(caller_index, "rejected signing request from unknown caller");
        Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse { error: format!("unknown caller index {caller_index}") }),
        ))
    }
}

fn parse_arena(arena: &str) -> Result<Pubkey, (StatusCode, Json<ErrorResponse>)> {
    Pubkey::from_str(arena).map_err(|_| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: "invalid arena pubkey".into() }))
    })
}

async fn sign_settlement(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignSettlementRequest>,
) -> Result<Json<SignResponse>, (StatusCode, Json<ErrorResponse>)> {
    authenticate(&state, req.caller_index)?;
    let arena_pubkey = parse_arena(&req.arena)?;

    let arena = crate::rpc::fetch_arena(&state.rpc, &arena_pubkey).map_err(|e| {
        (StatusCode::BAD_GATEWAY, Json(ErrorResponse { error: e.to_string() }))
    })?;

    if arena.status != ArenaStatus::Active {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse { error: "arena is not active".into() }),
        ));
    }
    if req.nonce != arena.settlement_nonce {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!(
                    "stale nonce: requested {}, on-chain {}",
                    req.nonce, arena.settlement_nonce
                ),
            }),
        ));
    }

    let signature = state.signer.sign_settlement(&arena_pubkey.to_bytes(), req.winner, req.nonce);
    info!(arena = %arena_pubkey, winner = req.winner, nonce = req.nonce, "signed settlement");
    Ok(Json(SignResponse {
        oracle_index: state.config.oracle_index,
        signature: STANDARD.encode(signature.to_bytes()),
    }))
}

async fn sign_reset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignResetRequest>,
) -> Result<Json<SignResponse>, (StatusCode, Json<ErrorResponse>)> {
    authenticate(&state, req.caller_index)?;
    let arena_pubkey = parse_arena(&req.arena)?;

    let arena = crate::rpc::fetch_arena(&state.rpc, &arena_pubkey).map_err(|e| {
        (StatusCode::BAD_GATEWAY, Json(ErrorResponse { error: e.to_string() }))
    })?;

    if arena.status != ArenaStatus::Settled {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse { error: "arena is not settled".into() }),
        ));
    }
    if req.nonce != arena.settlement_nonce {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!(
                    "stale nonce: requested {}, on-chain {}",
                    req.nonce, arena.settlement_nonce
                ),
            }),
        ));
    }

    let signature = state.signer.sign_reset(&arena_pubkey.to_bytes(), req.nonce);
    info!(arena = %arena_pubkey, nonce = req.nonce, "signed reset");
    Ok(Json(SignResponse {
        oracle_index: state.config.oracle_index,
        signature: STANDARD.encode(signature.to_bytes()),
    }))
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sign/settlement", post(sign_settlement))
        .route("/sign/reset", post(sign_reset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
