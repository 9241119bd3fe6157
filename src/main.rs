//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sigo_backend::{
    config::{AppState, Config},
    routes::create_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Migraciones de SQLx al arrancar
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migraciones de la base de datos aplicadas");

    if let Some((email, password)) = &config.bootstrap_admin {
        app_state.user_service.ensure_bootstrap_admin(email, password).await?;
    }

    let app = create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
