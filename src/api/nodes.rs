use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse};
use crate::consensus::normalize_address;

/// Register one or more peers. Nothing is registered if any address is bad.
#[post("/nodes/register")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    let nodes = match body.into_inner().nodes {
        Some(nodes) if !nodes.is_empty() => nodes,
        _ => return HttpResponse::BadRequest().body("Error: Please supply a valid list of nodes"),
    };

    let invalid: Vec<&str> = nodes
        .iter()
        .filter(|n| normalize_address(n).is_none())
        .map(String::as_str)
        .collect();
    if !invalid.is_empty() {
        warn!("POST /nodes/register - rejected addresses {invalid:?}");
        return HttpResponse::BadRequest().body(format!("Error: invalid node address {invalid:?}"));
    }

    for node in &nodes {
        if let Ok(addr) = state.peers.register(node) {
            info!("peer {addr} registered");
        }
    }

    let mut total_nodes: Vec<String> = state.peers.all().into_iter().collect();
    total_nodes.sort();
    HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added",
        total_nodes,
    })
}

/// Run consensus against every known peer and adopt the winner.
#[get("/nodes/resolve")]
pub async fn resolve_conflicts(state: web::Data<AppState>) -> impl Responder {
    let local = state.ledger.chain_snapshot();
    let peers = state.peers.all();
    let resolution = state.resolver.resolve(local, &peers).await;

    // The ledger re-checks length under its lock: it may have grown meanwhile
    if resolution.replaced && state.ledger.adopt_chain(resolution.chain.clone()) {
        return HttpResponse::Ok().json(ResolveResponse::Replaced {
            message: "Our chain was replaced",
            new_chain: resolution.chain,
        });
    }

    HttpResponse::Ok().json(ResolveResponse::Authoritative {
        message: "Our chain is authoritative",
        chain: state.ledger.chain_snapshot(),
    })
}
