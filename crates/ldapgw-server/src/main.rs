//! LDAP gateway server binary.

use anyhow::Context;
use ldapgw_core::GatewayConfig;
use ldapgw_directory::DirectoryGateway;
use ldapgw_server::{router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env().context("loading configuration")?;
    let gateway = DirectoryGateway::new(config.trust(), config.connect_timeout())
        .context("resolving TLS trust strategy")?;

    let app = router(AppState::new(gateway));
    let listener = tokio::net::TcpListener::bind(config.listen())
        .await
        .with_context(|| format!("binding {}", config.listen()))?;

    tracing::info!(listen = %config.listen(), "LDAP gateway listening");
    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
