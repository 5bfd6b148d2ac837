use eventia_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    eventia_observability::init_with(config.log_format);
    if config.dev_secret {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let services = app::services::build_services(&config).await?;
    let jobs = app::services::spawn_jobs(&services, &config);
    let router = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    for job in jobs {
        job.shutdown().await;
    }
    Ok(())
}
