use std::time::Instant;

use actix_web::{HttpResponse, Responder, get, web};
use log::{debug, info, warn};

use super::models::{AppState, MineResponse};
use crate::transaction::Transaction;

/// Mine a new block:
/// - Snapshot the tip and search for the next proof off the request thread
/// - Give up if the chain gets replaced or the mining deadline passes
/// - Reward this node and forge the block, unless the tip moved meanwhile
#[get("/mine")]
pub async fn mine(state: web::Data<AppState>) -> impl Responder {
    let job = state.ledger.mining_job();
    debug!(
        "MINER - searching proof for block #{} (last_proof={})",
        job.index, job.last_proof
    );

    let t0 = Instant::now();
    let outcome = {
        let state = state.clone();
        let job = job.clone();
        web::block(move || {
            let deadline = state.mine_timeout.map(|t| Instant::now() + t);
            state.ledger.pow().mine_until(job.last_proof, || {
                !state.ledger.is_current(&job) || deadline.is_some_and(|d| Instant::now() >= d)
            })
        })
        .await
    };

    let proof = match outcome {
        Ok(Ok(proof)) => proof,
        Ok(Err(e)) => {
            warn!("MINER - {e}");
            return HttpResponse::Conflict().body(e.to_string());
        }
        Err(e) => {
            warn!("MINER - worker failed: {e}");
            return HttpResponse::InternalServerError().body("mining worker failed");
        }
    };
    debug!(
        "MINER - proof {} found in {} ms",
        proof,
        t0.elapsed().as_millis()
    );

    let block = match state
        .ledger
        .forge_mined_block(&job, proof, Transaction::reward(&state.node_id))
    {
        Ok(block) => block,
        Err(e) => {
            warn!("MINER - discarding proof {proof}: {e}");
            return HttpResponse::Conflict().body(e.to_string());
        }
    };

    info!(
        "MINER - sealed block #{} (proof={}, txs={})",
        block.index,
        block.proof,
        block.transactions.len()
    );
    HttpResponse::Ok().json(MineResponse {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    })
}
