mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use pricedb_core::NameTable;
use pricedb_pipeline::PipelineContext;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(pricedb_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting pricedb-server");

    let pool_config = pricedb_db::PoolConfig::from_app_config(&config);
    let pool = pricedb_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = pricedb_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let names = match pricedb_core::load_name_table(&config.asset_names_path)? {
        Some(table) => table,
        None => {
            tracing::warn!(
                path = %config.asset_names_path.display(),
                "asset name table not found, using source titles only"
            );
            NameTable::default()
        }
    };
    let ctx = Arc::new(PipelineContext::from_app_config(
        &config,
        pool.clone(),
        Arc::new(names),
    )?);

    let mut scheduler = scheduler::build_scheduler(ctx, &config).await?;

    let app = build_app(AppState { pool });
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
