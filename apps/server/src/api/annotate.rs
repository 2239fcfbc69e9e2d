use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use fxlens_core::annotation::{AnnotationController, NoOpOverlay, ScanReport};
use fxlens_core::document::{parse_html, shared, to_html};
use fxlens_core::extraction::{CurrencyMention, MentionExtractor};
use fxlens_core::settings::{ConversionMode, FixedSettings, SettingsStore, SettingsUpdate};
use serde::{Deserialize, Serialize};

use crate::{
    error::{currency_param, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest {
    html: String,
    /// Per-request overrides of the stored settings.
    #[serde(default)]
    settings: Option<SettingsUpdate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    html: String,
    /// Absent when annotation is off for the effective settings.
    report: Option<ScanReport>,
}

/// Annotate a standalone HTML document once and return it.
async fn annotate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnnotateRequest>,
) -> ApiResult<Json<AnnotateResponse>> {
    let mut settings = state.settings_service.get();
    if let Some(update) = &body.settings {
        settings.merge(update);
        settings.validate()?;
    }
    if settings.mode != ConversionMode::Auto {
        tracing::debug!("Annotating in {:?} mode as a one-off auto scan", settings.mode);
        settings.mode = ConversionMode::Auto;
    }

    let document = shared(parse_html(&body.html).map_err(fxlens_core::Error::from)?);
    let controller = AnnotationController::new(
        document.clone(),
        state.resolver.clone(),
        Arc::new(FixedSettings::new(settings)),
        Arc::new(NoOpOverlay),
    );
    let report = controller.scan().await;

    let html = {
        let document = document.lock().unwrap_or_else(|p| p.into_inner());
        to_html(&document)
    };
    Ok(Json(AnnotateResponse { html, report }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest {
    text: String,
    /// Also match bare decimal numbers, read as this currency.
    implied_currency: Option<String>,
}

async fn extract(Json(body): Json<ExtractRequest>) -> ApiResult<Json<Vec<CurrencyMention>>> {
    let extractor = match &body.implied_currency {
        Some(code) => MentionExtractor::with_implied_currency(&currency_param(
            "impliedCurrency",
            code,
        )?),
        None => MentionExtractor::explicit(),
    };
    Ok(Json(extractor.extract(&body.text)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/annotate", post(annotate))
        .route("/extract", post(extract))
}
