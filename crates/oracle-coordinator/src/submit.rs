//! Submitter: collects threshold peer signatures concurrently over a winner
//! already derived from the battle simulator (see `main::run_settle`), then
//! submits the settlement transaction.
//!
//! Every peer call is independent and bounded by its own timeout; a peer
//! that's unreachable, slow, or returns a stale-nonce rejection is simply
//! dropped from the set rather than failing the whole round, matching the
//! program's threshold model — only `threshold` valid, distinct signatures
//! are required, not all three.

use crate::config::{NodeConfig, PeerConfig};
use crate::error::CoordinatorError;
use crate::rpc::{fetch_arena, ArenaStatus};
use crate::server::{SignResetRequest, SignResponse, SignSettlementRequest};
use crate::signer::OracleSigner;
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use futures::future::join_all;
use sha2::{Digest, Sha256};
use solana_client::rpc_client::RpcClient;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer as _;
use solana_sdk::sysvar;
use solana_sdk::transaction::Transaction;
use std::time::Duration;
use tracing::{info, warn};

const THRESHOLD: usize = 2;
const PEER_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_SUBMIT_ATTEMPTS: u32 = 4;

pub struct CollectedSignature {
    pub oracle_index: u8,
    pub signature: [u8; 64],
}

/// `sha256("global:<name>")[..8]`, Anchor's instruction discriminator.
fn discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{name}").as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

async fn collect_settlement_signature(
    client: &reqwest::Client,
    peer: &PeerConfig,
    arena: &Pubkey,
    winner: u8,
    nonce: u64,
    caller_index: u8,
    oracles: &[Pubkey; 3],
    message: &[u8],
) -> Option<CollectedSignature> {
    let url = format!("{}/sign/settlement", peer.endpoint.trim_end_matches('/'));
    let req = SignSettlementRequest { caller_index, arena: arena.to_string(), winner, nonce };

    let response = match tokio::time::timeout(PEER_TIMEOUT, client.post(&url).json(&req).send()).await {
        Ok(Ok(resp)) if resp.status().is_success() => resp,
        Ok(Ok(resp)) => {
            warn!(peer = %peer.endpoint, status = %resp.status(), "peer rejected settlement signing request");
            return None;
        }
        Ok(Err(err)) => {
            warn!(peer = %peer.endpoint, error = %err, "peer request failed");
            return None;
        }
        Err(_) => {
            warn!(peer = %peer.endpoint, "peer request timed out");
            return None;
        }
    };

    let parsed: SignResponse = match response.json().await {
        Ok(p) => p,
        Err(err) => {
            warn!(peer = %peer.endpoint, error = %err, "peer returned malformed response");
            return None;
        }
    };

    verify_and_wrap(parsed, oracles, message)
}

async fn collect_reset_signature(
    client: &reqwest::Client,
    peer: &PeerConfig,
    arena: &Pubkey,
    nonce: u64,
    caller_index: u8,
    oracles: &[Pubkey; 3],
    message: &[u8],
) -> Option<CollectedSignature> {
    let url = format!("{}/sign/reset", peer.endpoint.trim_end_matches('/'));
    let req = SignResetRequest { caller_index, arena: arena.to_string(), nonce };

    let response = match tokio::time::timeout(PEER_TIMEOUT, client.post(&url).json(&req).send()).await {
        Ok(Ok(resp)) if resp.status().is_success() => resp,
        _ => return None,
    };

    let parsed: SignResponse = response.json().await.ok()?;
    verify_and_wrap(parsed, oracles, message)
}

fn verify_and_wrap(
    parsed: SignResponse,
    oracles: &[Pubkey; 3],
    message: &[u8],
) -> Option<CollectedSignature> {
    let oracle_index = parsed.oracle_index;
    if oracle_index as usize >= 3 {
        return None;
    }
    let raw = STANDARD.decode(parsed.signature).ok()?;
    let signature_bytes: [u8; 64] = raw.as_slice().try_into().ok()?;
    let signature = Signature::from_bytes(&signature_bytes);

    let verifying_key = VerifyingKey::from_bytes(&oracles[oracle_index as usize].to_bytes()).ok()?;
    if verifying_key.verify(message, &signature).is_err() {
        warn!(oracle_index, "peer returned a signature that fails local verification");
        return None;
    }

    Some(CollectedSignature { oracle_index, signature: signature_bytes })
}

/// Collects this node's own signature plus up to `threshold` valid peer
/// signatures, deduplicated by `oracle_index`. Returns as soon as the
/// threshold is met or every peer has been heard from.
pub async fn collect_settlement_threshold(
    config: &NodeConfig,
    signer: &OracleSigner,
    oracles: &[Pubkey; 3],
    arena: &Pubkey,
    winner: u8,
    nonce: u64,
) -> Result<Vec<CollectedSignature>, CoordinatorError> {
    let message = soliseum_messages::settle_message(&arena.to_bytes(), winner, nonce);

    let mut collected = vec![CollectedSignature {
        oracle_index: config.oracle_index,
        signature: signer.sign_settlement(&arena.to_bytes(), winner, nonce).to_bytes(),
    }];

    let client = reqwest::Client::new();
    let calls = config.peers.iter().map(|peer| {
        collect_settlement_signature(
            &client,
            peer,
            arena,
            winner,
            nonce,
            config.oracle_index,
            oracles,
            &message,
        )
    });
    let results = join_all(calls).await;
    for result in results.into_iter().flatten() {
        if !collected.iter().any(|c| c.oracle_index == result.oracle_index) {
            collected.push(result);
        }
        if collected.len() >= THRESHOLD {
            break;
        }
    }

    if collected.len() < THRESHOLD {
        return Err(CoordinatorError::ThresholdNotMet { collected: collected.len(), threshold: THRESHOLD });
    }
    Ok(collected)
}

pub async fn collect_reset_threshold(
    config: &NodeConfig,
    signer: &OracleSigner,
    oracles: &[Pubkey; 3],
    arena: &Pubkey,
    nonce: u64,
) -> Result<Vec<CollectedSignature>, CoordinatorError> {
    let message = soliseum_messages::reset_message(&arena.to_bytes(), nonce);

    let mut collected = vec![CollectedSignature {
        oracle_index: config.oracle_index,
        signature: signer.sign_reset(&arena.to_bytes(), nonce).to_bytes(),
    }];

    let client = reqwest::Client::new();
    let calls = config
        .peers
        .iter()
        .map(|peer| collect_reset_signature(&client, peer, arena, nonce, config.oracle_index, oracles, &message));
    let results = join_all(calls).await;
    for result in results.into_iter().flatten() {
        if !collected.iter().any(|c| c.oracle_index == result.oracle_index) {
            collected.push(result);
        }
        if collected.len() >= THRESHOLD {
            break;
        }
    }

    if collected.len() < THRESHOLD {
        return Err(CoordinatorError::ThresholdNotMet { collected: collected.len(), threshold: THRESHOLD });
    }
    Ok(collected)
}

fn ed25519_verify_instruction(pubkey: [u8; 32], signature: [u8; 64], message: &[u8]) -> Instruction {
    const HEADER_LEN: u16 = 2 + 14;
    let signature_offset = HEADER_LEN;
    let pubkey_offset = signature_offset + 64;
    let message_offset = pubkey_offset + 32;

    let mut data = Vec::with_capacity(HEADER_LEN as usize + 64 + 32 + message.len());
    data.push(1u8); // num_signatures
    data.push(0u8); // padding
    data.extend_from_slice(&signature_offset.to_le_bytes());
    data.extend_from_slice(&u16::MAX.to_le_bytes()); // signature_instruction_index: this ix
    data.extend_from_slice(&pubkey_offset.to_le_bytes());
    data.extend_from_slice(&u16::MAX.to_le_bytes()); // public_key_instruction_index
    data.extend_from_slice(&message_offset.to_le_bytes());
    data.extend_from_slice(&(message.len() as u16).to_le_bytes());
    data.extend_from_slice(&u16::MAX.to_le_bytes()); // message_instruction_index
    data.extend_from_slice(&signature);
    data.extend_from_slice(&pubkey);
    data.extend_from_slice(message);

    Instruction { program_id: solana_sdk::ed25519_program::id(), accounts: vec![], data }
}

fn settle_game_instruction(
    program_id: &Pubkey,
    arena: &Pubkey,
    winner: u8,
    signatures: &[CollectedSignature],
) -> Instruction {
    let mut data = discriminator("settle_game").to_vec();
    data.push(winner);
    data.extend_from_slice(&(signatures.len() as u32).to_le_bytes());
    for sig in signatures {
        data.push(sig.oracle_index);
        data.extend_from_slice(&sig.signature);
    }

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*arena, false),
            AccountMeta::new_readonly(sysvar::instructions::id(), false),
        ],
        data,
    }
}

fn reset_arena_instruction(
    program_id: &Pubkey,
    arena: &Pubkey,
    creator: &Pubkey,
    signatures: &[CollectedSignature],
) -> Instruction {
    let mut data = discriminator("reset_arena").to_vec();
    data.extend_from_slice(&(signatures.len() as u32).to_le_bytes());
    for sig in signatures {
        data.push(sig.oracle_index);
        data.extend_from_slice(&sig.signature);
    }

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*arena, false),
            AccountMeta::new_readonly(*creator, true),
            AccountMeta::new_readonly(sysvar::instructions::id(), false),
        ],
        data,
    }
}

/// Submits a `settle_game` transaction backed by threshold oracle signatures.
/// Aborts without retrying if the on-chain nonce has moved past the nonce the
/// signatures were collected against — another submitter already won the
/// race.
pub async fn submit_settlement(
    rpc: &RpcClient,
    payer: &Keypair,
    program_id: &Pubkey,
    arena: &Pubkey,
    oracles: &[Pubkey; 3],
    winner: u8,
    expected_nonce: u64,
    signatures: Vec<CollectedSignature>,
) -> Result<(), CoordinatorError> {
    let current = fetch_arena(rpc, arena)
        .map_err(|e| CoordinatorError::SubmissionFailed(e.to_string()))?;
    if current.settlement_nonce != expected_nonce {
        return Err(CoordinatorError::StaleNonce {
            expected: expected_nonce,
            observed: current.settlement_nonce,
        });
    }
    if current.status != ArenaStatus::Active {
        return Err(CoordinatorError::SubmissionFailed("arena is no longer active".into()));
    }

    let mut precompile_ixs = Vec::with_capacity(signatures.len());
    let message = soliseum_messages::settle_message(&arena.to_bytes(), winner, expected_nonce);
    for sig in &signatures {
        precompile_ixs.push(ed25519_verify_instruction(
            oracles[sig.oracle_index as usize].to_bytes(),
            sig.signature,
            &message,
        ));
    }
    let settle_ix = settle_game_instruction(program_id, arena, winner, &signatures);

    let mut instructions = precompile_ixs;
    instructions.push(settle_ix);

    submit_with_retry(rpc, payer, instructions).await
}

pub async fn submit_reset(
    rpc: &RpcClient,
    payer: &Keypair,
    program_id: &Pubkey,
    arena: &Pubkey,
    oracles: &[Pubkey; 3],
    expected_nonce: u64,
    signatures: Vec<CollectedSignature>,
) -> Result<(), CoordinatorError> {
    let current = fetch_arena(rpc, arena)
        .map_err(|e| CoordinatorError::SubmissionFailed(e.to_string()))?;
    if current.settlement_nonce != expected_nonce {
        return Err(CoordinatorError::StaleNonce {
            expected: expected_nonce,
            observed: current.settlement_nonce,
        });
    }

    let message = soliseum_messages::reset_message(&arena.to_bytes(), expected_nonce);
    let mut instructions: Vec<Instruction> = signatures
        .iter()
        .map(|sig| ed25519_verify_instruction(oracles[sig.oracle_index as usize].to_bytes(), sig.signature, &message))
        .collect();
    instructions.push(reset_arena_instruction(program_id, arena, &current.creator, &signatures));

    submit_with_retry(rpc, payer, instructions).await
}

async fn submit_with_retry(
    rpc: &RpcClient,
    payer: &Keypair,
    instructions: Vec<Instruction>,
) -> Result<(), CoordinatorError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let blockhash = rpc
            .get_latest_blockhash()
            .map_err(|e| CoordinatorError::SubmissionFailed(e.to_string()))?;
        let tx = Transaction::new_signed_with_payer(
            &instructions,
            Some(&payer.pubkey()),
            &[payer],
            blockhash,
        );

        match rpc.send_and_confirm_transaction(&tx) {
            Ok(signature) => {
                info!(%signature, attempt, "settlement transaction confirmed");
                return Ok(());
            }
            Err(err) if attempt < MAX_SUBMIT_ATTEMPTS => {
                let backoff = Duration::from_millis(250 * 2u64.pow(attempt - 1));
                warn!(attempt, error = %err, "submission failed, retrying after backoff");
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(CoordinatorError::SubmissionFailed(err.to_string())),
        }
    }
}

pub fn program_id_from_str(s: &str) -> Result<Pubkey> {
    s.parse().with_context(|| format!("invalid program id {s}"))
}

pub fn arena_from_str(s: &str) -> Result<Pubkey> {
    s.parse().with_context(|| format!("invalid arena pubkey {s}"))
}

pub fn require_nonempty(peers: &[PeerConfig]) -> Result<()> {
    if peers.is_empty() {
        return Err(anyhow!("no peers configured"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_is_stable_and_eight_bytes() {
        let a = discriminator("settle_game");
        let b = discriminator("settle_game");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert_ne!(discriminator("settle_game"), discriminator("reset_arena"));
    }

    #[test]
    fn ed25519_instruction_places_fields_at_declared_offsets() {
        let pubkey = [1u8; 32];
        let signature = [2u8; 64];
        let message = b"soliseum:settle:test".to_vec();
        let ix = ed25519_verify_instruction(pubkey, signature, &message);
        assert_eq!(ix.program_id, solana_sdk::ed25519_program::id());

        let sig_offset = u16::from_le_bytes([ix.data[2], ix.data[3]]) as usize;
        let pk_offset = u16::from_le_bytes([ix.data[6], ix.data[7]]) as usize;
        let msg_offset = u16::from_le_bytes([ix.data[10], ix.data[11]]) as usize;
        let msg_len = u16::from_le_bytes([ix.data[12], ix.data[13]]) as usize;

        assert_eq!(&ix.data[sig_offset..sig_offset + 64], &signature[..]);
        assert_eq!(&ix.data[pk_offset..pk_offset + 32], &pubkey[..]);
        assert_eq!(&ix.data[msg_offset..msg_offset + msg_len], &message[..]);
    }
}
