use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use users_api::{router, AppState, UsersApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("users_api=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let mut config = UsersApiConfig::default();
    if let Ok(host) = std::env::var("USERS_API_HOST") {
        config.host = host;
    }
    if let Ok(port) = std::env::var("USERS_API_PORT") {
        config.port = port.parse()?;
    }
    if let Ok(root) = std::env::var("USERS_API_WWW_ROOT") {
        config.www_root = Some(root.into());
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config);
    let app = router(state);

    tracing::info!(%addr, "users-api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
