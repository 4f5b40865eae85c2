use selempang_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_environment()?;

    print_banner();

    tracing::info!("SelempangKu server starting...");

    let config = Config::from_env();

    let state = ServerState::initialize(&config).await;

    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        anyhow::bail!("server exited with error: {e}");
    }

    Ok(())
}
