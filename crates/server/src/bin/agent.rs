use ledgerqa_server::{agent_router, build_app_state, config::get_config};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = get_config()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let app_state = build_app_state(config).await?;
    let app = agent_router(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Agent server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
