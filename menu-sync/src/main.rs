use menu_sync::{Server, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv, configuration, logging
    let config = setup_environment();

    tracing::info!(
        environment = %config.environment,
        tenant_id = %config.tenant_id,
        database = %config.database_path,
        "Menu sync server starting..."
    );

    // 2. Initialize state and serve until ctrl-c
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
