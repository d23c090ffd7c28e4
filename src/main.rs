use std::io;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use pow_ledger::api::{self, AppState};
use pow_ledger::config::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    let host = config.host.clone();
    let port = config.port;

    println!("⛓️ Starting ledger node at http://{host}:{port}");
    let state = web::Data::new(AppState::from_config(&config).map_err(io::Error::other)?);
    info!(
        "node id {} (difficulty={}, peer timeout={:?}, peers={})",
        state.node_id,
        state.ledger.pow().difficulty(),
        config.peer_timeout,
        state.peers.len()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
