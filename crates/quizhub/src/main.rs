use std::sync::Arc;

use quizhub::{Config, GatewayError, GatewayServer, GatewayState, http, spawn_sweeper};
use quizhub_bank::QuestionBank;
use quizhub_room::{RandomCodes, RoomRegistry};

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let bank = Arc::new(QuestionBank::builtin());
    let registry = RoomRegistry::with_parts(
        bank,
        Box::new(RandomCodes::default()),
        config.registry_config(),
    );
    let state = GatewayState::new(registry);

    let http_routes = http::routes(state.clone());
    let http_addr = config.http_addr;
    tokio::spawn(async move {
        tracing::info!(%http_addr, "http api listening");
        warp::serve(http_routes).run(http_addr).await;
    });

    spawn_sweeper(state.clone(), config.sweep_interval);

    let server = GatewayServer::bind(&config.ws_addr, state).await?;
    server.run().await
}
