use actix_web::{App, HttpServer, middleware, web};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::prelude::*;

use trader_profiler::api::api_handlers::configure_routes;
use trader_profiler::api::api_objects::AppContext;
use trader_profiler::model_artifacts::ModelArtifacts;
use trader_profiler::prediction::cluster_labels::ClusterLabelTable;
use trader_profiler::utils::{Cli, resolve_config};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    info!("Configuration loaded: {:?}", config);

    // Loaded once; a missing or corrupt artifact stops the process here
    let artifacts = ModelArtifacts::load(&config.artifact_paths())
        .context("failed to load model artifacts")?;
    let context = web::Data::new(AppContext::new(artifacts, ClusterLabelTable::default()));

    info!(
        "Trader profiling dashboard listening on http://{}:{}",
        config.bind_address, config.port
    );
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(context.clone())
            .configure(configure_routes)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
