use anyhow::Context;

use vitach_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vitach_observability::init();

    let config = AppConfig::from_env()?;
    let (app, services) = vitach_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    tokio::task::spawn_blocking(move || services.shutdown()).await?;
    Ok(())
}
