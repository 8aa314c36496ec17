use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::{DatabaseManager, Store};
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};
use crate::state::AppState;

/// Open the configured store and serve the API until ctrl-c
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store = DatabaseManager::open_store(&config).await?;
    let bind_addr = config.bind_addr();
    let state = AppState::new(store, config);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("QuadraFácil API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(public::auth_register))
        .route("/api/auth/login", post(public::auth_login))
}

/// Routes that need a valid session. Layers run bottom-up: the token is
/// checked first, then the user row is loaded.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(session_routes())
        .merge(client_routes())
        .merge(payment_routes())
        .merge(receipt_routes())
        .merge(court_routes())
        .merge(report_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/auth/session",
            get(protected::session_get).delete(protected::session_delete),
        )
        .route("/api/auth/session/refresh", put(protected::session_refresh))
}

fn client_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/clients",
            get(protected::clients_list).post(protected::clients_create),
        )
        .route(
            "/api/clients/:id",
            get(protected::client_get)
                .put(protected::client_put)
                .delete(protected::client_delete),
        )
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/payments",
            get(protected::payments_list).post(protected::payments_create),
        )
        .route(
            "/api/payments/:id",
            get(protected::payment_get)
                .put(protected::payment_put)
                .delete(protected::payment_delete),
        )
}

fn receipt_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/receipts",
            get(protected::receipts_list).post(protected::receipts_create),
        )
        .route(
            "/api/receipts/:id",
            get(protected::receipt_get)
                .put(protected::receipt_put)
                .delete(protected::receipt_delete),
        )
}

fn court_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/courts",
            get(protected::courts_list).post(protected::courts_create),
        )
        .route(
            "/api/courts/:id",
            get(protected::court_get)
                .put(protected::court_put)
                .delete(protected::court_delete),
        )
}

fn report_routes() -> Router<AppState> {
    Router::new().route("/api/reports/summary", get(protected::reports_summary))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    // credentials are allowed for the session cookie, which rules out wildcards
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "QuadraFácil API",
            "version": version,
            "description": "Business management API for sports-court rental venues",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/api/auth/register, /api/auth/login (public - token acquisition)",
                "session": "/api/auth/session[/refresh] (protected)",
                "clients": "/api/clients[/:id] (protected)",
                "payments": "/api/payments[/:id] (protected)",
                "receipts": "/api/receipts[/:id] (protected)",
                "courts": "/api/courts[/:id] (protected)",
                "reports": "/api/reports/summary (protected)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::testing::TestContext;

    #[tokio::test]
    async fn root_and_health_are_public() {
        let ctx = TestContext::new();

        let (status, body) = ctx.send(Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "QuadraFácil API");

        let (status, body) = ctx.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let ctx = TestContext::new();
        let (status, _) = ctx.send(Method::GET, "/api/nothing-here", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
