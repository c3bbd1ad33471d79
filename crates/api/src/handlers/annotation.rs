//! Handlers for region hit-testing, overlay rendering and the
//! disabled-region state.
//!
//! Each request re-reads and decrypts the dataset, then joins it with the
//! current disabled-region snapshot. Only overlay images and region
//! summaries are returned; vertex data stays on the server.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use roiview_core::dataset::load_annotation_dataset;
use roiview_core::error::CoreError;
use roiview_core::geometry::find_region_containing_point;
use roiview_core::overlay::{render_overlay_svg, OverlayRequest};
use roiview_core::region::validate_region_id;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::response::{DisabledIdsResponse, HitTestResponse, OverlayResponse};
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request bodies
   -------------------------------------------------------------------------- */

/// Pointer position plus the client's current queue.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitTestInput {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub queue_ids: Vec<String>,
    #[serde(default)]
    pub include_outline: bool,
}

/// Overlay state to render.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayInput {
    pub queue_ids: Vec<String>,
    pub hover_id: Option<String>,
    pub include_outline: bool,
}

/// Disable or re-enable a batch of regions.
#[derive(Debug, Deserialize)]
pub struct DisableInput {
    pub ids: Vec<String>,
    pub disabled: bool,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// POST /annotation/hit-test
///
/// Find the first enabled region under the pointer and render it as the
/// hover highlight on top of the queued regions.
pub async fn hit_test(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<HitTestInput>,
) -> AppResult<impl IntoResponse> {
    if !input.x.is_finite() || !input.y.is_finite() {
        return Err(CoreError::Validation("x and y must be finite numbers".to_string()).into());
    }

    let dataset = load_annotation_dataset(&state.dataset).await?;
    let disabled = state.disabled.snapshot_set().await;

    let hit = find_region_containing_point(&dataset.boundaries, input.x, input.y, |id, _| {
        disabled.contains(id)
    });
    let hover_id = hit.as_ref().map(|h| h.id.clone());

    let overlay_image = render_overlay_svg(&OverlayRequest {
        dataset: &dataset,
        highlight_ids: &input.queue_ids,
        hovered_id: hover_id.as_deref(),
        disabled_ids: &disabled,
        include_outline: input.include_outline,
    });

    tracing::debug!(
        x = input.x,
        y = input.y,
        hover_id = ?hover_id,
        queued = input.queue_ids.len(),
        "Hit-test resolved"
    );

    Ok(Json(HitTestResponse {
        ok: true,
        hover_id,
        overlay_image,
        region: hit.map(|h| h.summary()),
    }))
}

/// POST /annotation/overlay
///
/// Render the overlay for an explicit queue/hover state.
pub async fn render_overlay(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<OverlayInput>,
) -> AppResult<impl IntoResponse> {
    let dataset = load_annotation_dataset(&state.dataset).await?;
    let disabled = state.disabled.snapshot_set().await;

    let overlay_image = render_overlay_svg(&OverlayRequest {
        dataset: &dataset,
        highlight_ids: &input.queue_ids,
        hovered_id: input.hover_id.as_deref(),
        disabled_ids: &disabled,
        include_outline: input.include_outline,
    });

    Ok(Json(OverlayResponse {
        ok: true,
        overlay_image,
    }))
}

/// POST /annotation/instances/disable
///
/// Apply a disable/enable action to every listed region id.
pub async fn set_disabled(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<DisableInput>,
) -> AppResult<impl IntoResponse> {
    for id in &input.ids {
        validate_region_id(id)?;
    }

    state
        .disabled
        .set_many_disabled(&input.ids, input.disabled)
        .await;
    let disabled_ids = state.disabled.snapshot().await;

    tracing::info!(
        ids = ?input.ids,
        disabled = input.disabled,
        total_disabled = disabled_ids.len(),
        "Region disabled state updated"
    );

    Ok(Json(DisabledIdsResponse {
        ok: true,
        disabled_ids,
    }))
}

/// GET /annotation/instances/disabled
pub async fn list_disabled(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DisabledIdsResponse {
        ok: true,
        disabled_ids: state.disabled.snapshot().await,
    }))
}

/// DELETE /annotation/instances/disabled
///
/// Re-enable every region.
pub async fn clear_disabled(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    state.disabled.clear().await;
    tracing::info!("Disabled-region state cleared");

    Ok(Json(DisabledIdsResponse {
        ok: true,
        disabled_ids: Vec::new(),
    }))
}
