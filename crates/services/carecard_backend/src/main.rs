// --- File: crates/services/carecard_backend/src/main.rs ---
use carecard_backend::{build_router, AppServices};
use carecard_common::{logging, CarecardError, Context};
use carecard_config::load_config;
use carecard_db::{init_schema, DbClient};
use carecard_razorpay::RazorpayGateway;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), CarecardError> {
    let config = Arc::new(load_config().context("Failed to load configuration")?);
    // Keep the guard alive so the file writer flushes on shutdown.
    let _log_guard = logging::init_with_config(&config.logging);

    let db = DbClient::new(&config).await?;
    init_schema(&db).await?;

    if config.use_razorpay {
        info!("Razorpay enabled by configuration; checkout also requires the settings row");
    } else {
        warn!("Razorpay disabled: purchases are recorded as test transactions");
    }
    let gateway = Arc::new(RazorpayGateway::new(&config.razorpay));

    let app = build_router(AppServices {
        config: config.clone(),
        db,
        gateway,
    })?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}
