use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use fxlens_core::batch::{convert_batch, BatchRow};
use fxlens_core::conversion::ConversionResult;
use fxlens_core::settings::SettingsStore;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::{currency_param, ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertRequest {
    amount: Decimal,
    from: String,
    to: String,
    /// Defaults to the configured offset.
    rate_offset_percent: Option<Decimal>,
}

async fn convert(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConvertRequest>,
) -> ApiResult<Json<ConversionResult>> {
    if body.amount <= Decimal::ZERO {
        return Err(ApiError::BadRequest("amount must be positive".to_string()));
    }
    let from = currency_param("from", &body.from)?;
    let to = currency_param("to", &body.to)?;
    let offset = body
        .rate_offset_percent
        .unwrap_or_else(|| state.settings_service.get().rate_offset_percent);

    state
        .resolver
        .convert(body.amount, &from, &to, offset)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::Unavailable(format!("No {} rate available for {}", to, from)))
}

#[derive(Deserialize)]
struct BatchRequest {
    input: String,
}

async fn convert_lines(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchRequest>,
) -> Json<Vec<BatchRow>> {
    let settings = state.settings_service.get();
    Json(convert_batch(&state.resolver, &body.input, &settings).await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/convert", post(convert))
        .route("/convert/batch", post(convert_lines))
}
