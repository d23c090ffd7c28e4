use actix_web::{HttpResponse, Responder, post, web};
use log::{debug, warn};

use super::models::{AppState, MessageResponse, NewTxRequest};
use crate::transaction::Transaction;

/// Queue a transaction for the next mined block. No amount or address checks.
#[post("/transactions/new")]
pub async fn new_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let NewTxRequest {
        sender: Some(sender),
        recipient: Some(recipient),
        amount: Some(amount),
    } = body.into_inner()
    else {
        warn!("POST /transactions/new - rejected: missing values");
        return HttpResponse::BadRequest().body("Missing values");
    };

    let index = state
        .ledger
        .push_transaction(Transaction::new(sender, recipient, amount));
    debug!("POST /transactions/new - queued for block #{index}");

    HttpResponse::Created().json(MessageResponse {
        message: format!("Transaction will be added to Block {index}"),
    })
}
