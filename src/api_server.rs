// Axum API Server Module
//
// Purpose: HTTP surface over the recommendation service and the plan catalog
// Catalog reads are lock-free snapshots; prediction and rebuilds run on the blocking pool

#[cfg(feature = "api")]
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

#[cfg(feature = "api")]
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use crate::catalog::{self, BuildMetadata, CatalogHandle};

#[cfg(feature = "api")]
use crate::config::EngineConfig;

#[cfg(feature = "api")]
use crate::error::CatalogLookupError;

#[cfg(feature = "api")]
use crate::plan::{PlanStore, VariantTag};

#[cfg(feature = "api")]
use crate::predictor::{CentroidPredictor, CropPredictor, PredictorError};

#[cfg(feature = "api")]
use crate::recommendation::{RecommendationResponse, RecommendationService};

#[cfg(feature = "api")]
use crate::soil::SoilReading;

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    pub service: RecommendationService,
    pub config: Arc<EngineConfig>,
    /// Held for a whole rebuild so disk and memory always end on the same catalog
    rebuild_lock: Arc<tokio::sync::Mutex<()>>,
}

#[cfg(feature = "api")]
impl AppState {
    /// Load predictor and catalog from the configured paths
    ///
    /// Uses the persisted catalog when present, otherwise builds one from the Plan Store.
    pub fn load(config: EngineConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading crop predictor...");
        let predictor: Arc<dyn CropPredictor> = Arc::new(CentroidPredictor::load(&config.model_path)?);

        tracing::info!("Loading plan catalog...");
        let catalog = if config.catalog_path.exists() {
            catalog::read_catalog(&config.catalog_path)?
        } else {
            tracing::warn!(
                "No catalog at {:?}; building from plan store {:?}",
                config.catalog_path,
                config.plan_store_path
            );
            let store = PlanStore::load(&config.plan_store_path)?;
            catalog::build(&store).catalog
        };

        let service = RecommendationService::new(predictor, CatalogHandle::new(catalog));
        Ok(Self::from_parts(service, config))
    }

    pub fn from_parts(service: RecommendationService, config: EngineConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
            rebuild_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Crop database
        .route("/api/crops", get(list_crops))
        .route("/api/crops/:crop", get(get_crop))
        .route("/api/crops/:crop/plans/:variant", get(get_crop_plan))

        // Recommendation
        .route("/api/recommend", post(recommend))

        // Catalog maintenance
        .route("/api/catalog/rebuild", post(rebuild_catalog))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "crops": state.service.catalog().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[cfg(feature = "api")]
async fn list_crops(State(state): State<AppState>) -> Json<serde_json::Value> {
    let catalog = state.service.catalog();

    let data: Vec<serde_json::Value> = catalog
        .entries()
        .iter()
        .map(|(crop, entry)| {
            serde_json::json!({
                "crop": crop,
                "summary": entry.summary,
                "duration_weeks": entry.duration_weeks,
                "variants": entry.variant_tags(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "rows": data.len(),
        "data": data,
    }))
}

#[cfg(feature = "api")]
async fn get_crop(
    State(state): State<AppState>,
    Path(crop): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let catalog = state.service.catalog();
    let (name, entry) = catalog
        .resolve(&crop)
        .ok_or_else(|| CatalogLookupError::UnknownCrop { crop: crop.clone() })?;

    Ok(Json(serde_json::json!({
        "crop": name,
        "summary": entry.summary,
        "duration_weeks": entry.duration_weeks,
        "variants": entry.variants,
    })))
}

#[cfg(feature = "api")]
async fn get_crop_plan(
    State(state): State<AppState>,
    Path((crop, variant)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let catalog = state.service.catalog();
    let plan = catalog.plan(&crop, &VariantTag::parse(&variant))?;
    Ok(Json(serde_json::to_value(plan).map_err(|e| AppError::Internal(e.to_string()))?))
}

/// Soil reading plus optional plan variant to attach
#[cfg(feature = "api")]
#[derive(Debug, serde::Deserialize)]
struct RecommendRequest {
    #[serde(flatten)]
    reading: SoilReading,
    variant: Option<VariantTag>,
}

#[cfg(feature = "api")]
async fn recommend(
    State(state): State<AppState>,
    Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    payload
        .reading
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // CPU-bound work: run in blocking thread pool
    let service = state.service.clone();
    let response = tokio::task::spawn_blocking(move || {
        service.recommend_with_plan(&payload.reading, payload.variant.as_ref())
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    tracing::info!(
        "Recommended '{}' (plan available: {})",
        response.result.predicted_crop,
        response.result.plan_available
    );

    Ok(Json(response))
}

/// Rebuild the catalog from the Plan Store, persist it, then swap it in
#[cfg(feature = "api")]
async fn rebuild_catalog(
    State(state): State<AppState>,
) -> Result<Json<BuildMetadata>, AppError> {
    // One rebuild at a time
    let _guard = state.rebuild_lock.lock().await;

    let config = state.config.clone();
    let handle = state.service.catalog_handle().clone();

    let metadata = tokio::task::spawn_blocking(move || -> anyhow::Result<BuildMetadata> {
        let store = PlanStore::load(&config.plan_store_path)?;
        let build = catalog::build(&store);
        let metadata = BuildMetadata::for_build(&build, chrono::Utc::now());
        catalog::write_catalog(&config.catalog_path, &build.catalog, &metadata)?;
        handle.replace(build.catalog);
        Ok(metadata)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
    .map_err(|e| AppError::Internal(format!("Catalog rebuild error: {:#}", e)))?;

    tracing::info!(
        "Catalog rebuilt: {} crops, {} skipped",
        metadata.crop_count,
        metadata.skipped.len()
    );

    Ok(Json(metadata))
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    Internal(String),
}

#[cfg(feature = "api")]
impl From<CatalogLookupError> for AppError {
    fn from(err: CatalogLookupError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

#[cfg(feature = "api")]
impl From<PredictorError> for AppError {
    fn from(err: PredictorError) -> Self {
        AppError::Unprocessable(err.to_string())
    }
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
