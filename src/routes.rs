use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Instant};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;
use uuid::Uuid;

use crate::{
    engine::PredictionEngine,
    error::AppError,
    metrics::Metrics,
    types::{HealthResponse, PredictRequest, PredictResponse},
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PredictionEngine>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(engine: PredictionEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            metrics: Arc::new(Metrics::new()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4();

    let result = payload
        .map_err(AppError::from)
        .and_then(|Json(request)| {
            debug!(%request_id, ?request, "Received predict request");
            state
                .engine
                .predict(&request.ids(), request.continuous_feature)
        });

    state
        .metrics
        .observe_request(start_time.elapsed(), result.is_ok());

    let prediction = result?;
    debug!(
        %request_id,
        probability = prediction.probability(),
        "Predict request completed in {:?}",
        start_time.elapsed()
    );

    Ok(Json(PredictResponse {
        result: prediction.as_matrix(),
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        feature_store_entries: state.engine.feature_store().len(),
        feature_width: state.engine.feature_width(),
    })
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.format()
}
