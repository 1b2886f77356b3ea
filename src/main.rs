use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};
use tracing::{info, warn};

use menucatalog_rs::{
    handlers::{create_app, create_metrics_router},
    init_observability,
    observability::Metrics,
    repositories::{DynamoDbDrinkRepository, DynamoDbMealRepository, TableManager},
    shutdown_observability, Config, MenuCatalogStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_environment().context("Failed to load configuration")?;

    init_observability(
        &config.observability.service_name,
        &config.observability.service_version,
        config.observability.otlp_endpoint.as_deref(),
        config.observability.enable_json_logging,
        &config.observability.log_level,
    )?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!("Region: {}", config.database.region);
    info!(
        "DynamoDB Tables: meals={}, drinks={}",
        config.database.meals_table_name, config.database.drinks_table_name
    );

    let metrics = Arc::new(Metrics::new()?);
    let dynamodb_client = Arc::new(config.database.dynamodb_client().await);

    if config.database.create_tables {
        TableManager::new(dynamodb_client.clone())
            .ensure_catalog_tables(
                &config.database.meals_table_name,
                &config.database.drinks_table_name,
            )
            .await
            .context("Failed to provision catalog tables")?;
    }

    let meals_repository = Arc::new(DynamoDbMealRepository::new(
        dynamodb_client.clone(),
        config.database.meals_table_name.clone(),
        config.database.region.clone(),
    ));
    let drinks_repository = Arc::new(DynamoDbDrinkRepository::new(
        dynamodb_client,
        config.database.drinks_table_name.clone(),
        config.database.region.clone(),
    ));

    let store = Arc::new(MenuCatalogStore::new_with_metrics(
        meals_repository,
        drinks_repository,
        metrics.clone(),
    ));

    // Initial fetch; failures leave the catalog empty until the view reloads
    let (meals, drinks) = tokio::join!(store.load_meals(), store.load_drinks());
    if let Err(e) = meals {
        warn!("Initial meal load failed: {}", e);
    }
    if let Err(e) = drinks {
        warn!("Initial drink load failed: {}", e);
    }

    let metrics_addr = SocketAddr::new(
        config.server.host.parse()?,
        config.observability.metrics_port,
    );
    let metrics_listener = TcpListener::bind(metrics_addr).await?;
    info!("Metrics listening on {}", metrics_addr);
    let metrics_app = create_metrics_router(store.clone(), metrics.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, metrics_app).await {
            warn!("Metrics server stopped: {}", e);
        }
    });

    let app = create_app(store, metrics)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
        shutdown_observability().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
