use actix_web::{HttpResponse, Responder, get, web};

use super::models::AppState;
use crate::consensus::PeerChain;

/// Full chain with its length. Peers call this during resolution.
#[get("/chain")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(PeerChain::new(state.ledger.chain_snapshot()))
}
