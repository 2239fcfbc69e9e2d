use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use fxlens_core::settings::{
    ExtensionSettings, SettingsServiceTrait, SettingsStore, SettingsUpdate,
};
use fxlens_rates::FreshnessPolicy;

use crate::{error::ApiResult, main_lib::AppState};

async fn get_settings(State(state): State<Arc<AppState>>) -> Json<ExtensionSettings> {
    Json(state.settings_service.get())
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<ExtensionSettings>> {
    let settings = state.settings_service.update_settings(&update).await?;
    state
        .rate_cache
        .set_freshness(FreshnessPolicy::for_auto_update(settings.auto_update));
    Ok(Json(settings))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}
