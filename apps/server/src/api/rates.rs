use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use fxlens_rates::{CacheSummary, PrefetchOutcome, RateTable, MAJOR_CURRENCIES};
use serde::Deserialize;

use crate::{
    error::{currency_param, ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize, Default)]
struct RatesQuery {
    #[serde(default)]
    force: bool,
}

async fn get_rates(
    State(state): State<Arc<AppState>>,
    Path(base): Path<String>,
    Query(query): Query<RatesQuery>,
) -> ApiResult<Json<RateTable>> {
    let base = currency_param("base", &base)?;
    state
        .rate_cache
        .resolve(&base, query.force)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::Unavailable(format!("No rates available for {}", base)))
}

async fn refresh_rates(State(state): State<Arc<AppState>>) -> Json<Vec<PrefetchOutcome>> {
    Json(state.rate_cache.prefetch(MAJOR_CURRENCIES, true).await)
}

async fn get_cache_summary(State(state): State<Arc<AppState>>) -> ApiResult<Json<CacheSummary>> {
    Ok(Json(state.rate_cache.summary().await?))
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.rate_cache.clear().await?;
    tracing::info!("Rate cache cleared");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rates/cache", get(get_cache_summary).delete(clear_cache))
        .route("/rates/refresh", post(refresh_rates))
        .route("/rates/{base}", get(get_rates))
}
