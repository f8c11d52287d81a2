use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use likemind::services::cache::CacheKey;
use likemind::utils::validation;
use likemind::{init_tracing, AppState, Config, RecommendationResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Raw query parameters, validated before any of them reach the core.
#[derive(Debug, Deserialize)]
struct RecommendQuery {
    threshold: Option<String>,
    userid: Option<String>,
    howmany: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }

    fn success_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.to_string(),
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HashMap<String, String>>> {
    let store = state.store.snapshot();

    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "likemind-recommendation".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());
    status.insert("store_version".to_string(), store.version().to_string());
    status.insert("users".to_string(), store.user_count().to_string());
    status.insert("items".to_string(), store.item_count().to_string());
    status.insert("ratings".to_string(), store.rating_count().to_string());

    Json(ApiResponse::success(status))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<ApiResponse<RecommendationResponse>>, StatusCode> {
    let params = validation::parse_recommend_query(
        query.threshold.as_deref(),
        query.userid.as_deref(),
        query.howmany.as_deref(),
        &state.config.recommender,
    )
    .map_err(|e| {
        warn!("rejected recommend request: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let store = state.store.snapshot();
    let key = CacheKey::new(params.user_id, params.threshold, params.limit, store.version());
    let service = state.recommendation_service.clone();
    let cache = state.cache.clone();

    // The pipeline is pure CPU; keep it off the async workers and under the
    // boundary deadline.
    let deadline = Duration::from_millis(state.config.recommender.request_timeout_ms);
    let task = tokio::task::spawn_blocking(move || {
        cache.get_or_compute(key, || {
            service.recommend(&store, params.user_id, params.threshold, params.limit)
        })
    });

    let recommendations = match tokio::time::timeout(deadline, task).await {
        Ok(Ok(recommendations)) => recommendations,
        Ok(Err(e)) => {
            error!("recommendation task failed: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(_) => {
            warn!(
                user_id = params.user_id,
                timeout_ms = state.config.recommender.request_timeout_ms,
                "recommendation request timed out"
            );
            return Err(StatusCode::REQUEST_TIMEOUT);
        }
    };

    let response = RecommendationResponse::new(params.user_id, recommendations.as_ref().clone());
    if response.is_empty() {
        Ok(Json(ApiResponse::success_with_message(
            response,
            "No recommendation",
        )))
    } else {
        Ok(Json(ApiResponse::success(response)))
    }
}

async fn reload_store(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    match state.reload().await {
        Ok(version) => Ok(Json(ApiResponse::success(format!(
            "store reloaded at version {}",
            version
        )))),
        Err(e) => {
            error!("reload failed, previous snapshot keeps serving: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommend", get(get_recommendations))
        .route("/reload", post(reload_store))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing().await;

    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, using default configuration");
        Config::default()
    };
    info!("Starting Likemind recommendation server with config: {:?}", config.server);

    let state = AppState::new(config.clone()).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()).await?;
    info!("Server listening on {}", config.server.socket_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
