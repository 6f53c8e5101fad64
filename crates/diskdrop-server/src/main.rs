use tracing_subscriber::EnvFilter;

use diskdrop_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Diskdrop server starting");

    let config = ServerConfig::load();
    config.validate();

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        },
    };

    if let Err(e) = server.serve().await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
