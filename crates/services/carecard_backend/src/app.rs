// --- File: crates/services/carecard_backend/src/app.rs ---
use axum::{extract::State, routing::get, Router};
use carecard_checkout::CheckoutState;
use carecard_common::{
    config_error, ApiResponse, ApiResult, CarecardError, JwtVerifier, PaymentGateway,
};
use carecard_config::AppConfig;
use carecard_db::DbClient;
use carecard_portal::PortalState;
use http::{HeaderValue, Method};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Everything the routers share.
#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
    pub gateway: Arc<dyn PaymentGateway>,
}

async fn health_handler(State(db): State<DbClient>) -> ApiResult<Value> {
    let database = if db.is_healthy().await { "ok" } else { "unavailable" };
    Ok(ApiResponse::ok(json!({ "status": "ok", "database": database })))
}

fn cors_layer(config: &AppConfig) -> Result<CorsLayer, CarecardError> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    if config.server.allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }
    let origins = config
        .server
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| config_error(format!("invalid CORS origin '{origin}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Builds the full application: checkout and portal routers nested under
/// `/api`, plus request tracing and CORS.
pub fn build_router(services: AppServices) -> Result<Router, CarecardError> {
    let jwt = JwtVerifier::new(&services.config.auth)?;

    let checkout_router = carecard_checkout::routes(CheckoutState {
        config: services.config.clone(),
        db: services.db.clone(),
        gateway: services.gateway.clone(),
        jwt: jwt.clone(),
    });
    let portal_router = carecard_portal::routes(PortalState {
        config: services.config.clone(),
        db: services.db.clone(),
        jwt,
    });

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the CareCard API!" }))
        .route("/health", get(health_handler))
        .with_state(services.db.clone())
        .merge(checkout_router)
        .merge(portal_router);

    info!("Mounting checkout and portal routes under /api");
    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use carecard_checkout::doc::CheckoutApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "CareCard API",
                version = "0.1.0",
                description = "CareCard membership and checkout API"
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(CheckoutApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    Ok(app
        .layer(cors_layer(&services.config)?)
        .layer(TraceLayer::new_for_http()))
}
