use axum::Router;
use axum_helpers::server::{
    CleanupCoordinator, close_postgres, create_production_app, create_router, health_router,
};
use core_config::AppInfo;
use domain_vector::{MetadataRepository, VectorApiDoc, VectorIndexRepository, VectorService, handlers};
use sea_orm::DatabaseConnection;
use std::io;
use tracing::info;

use crate::config::Config;
use crate::health::ready_router;

/// Full application router: docs and `/api` routes plus `/health` and `/ready`.
pub fn build_router<I, M>(service: VectorService<I, M>, app: AppInfo) -> io::Result<Router>
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let api_routes = handlers::router(service.clone());

    Ok(create_router::<VectorApiDoc>(api_routes)?
        .merge(health_router(app))
        .merge(ready_router(service)))
}

/// Serves until shutdown, then closes the metadata pool if there is one.
pub async fn serve<I, M>(
    config: Config,
    index: I,
    metadata: M,
    db: Option<DatabaseConnection>,
) -> eyre::Result<()>
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let service = VectorService::new(index, metadata);
    let router = build_router(service, config.app)?;

    info!(
        "Starting {} v{} ({}s shutdown timeout)",
        config.app.name,
        config.app.version,
        config.server.shutdown_timeout.as_secs()
    );

    create_production_app(
        router,
        &config.server,
        config.server.shutdown_timeout,
        async move {
            let mut cleanup = CleanupCoordinator::new();
            if let Some(db) = db {
                cleanup.add_task("postgres", async move {
                    close_postgres(db, "metadata").await;
                });
            }
            cleanup.run().await;
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("{} shutdown complete", config.app.name);
    Ok(())
}
