//! Response bodies for the annotation endpoints.
//!
//! Every success body carries `"ok": true`; failures are rendered by
//! [`AppError`](crate::error::AppError) with `"ok": false`.

use roiview_core::geometry::RegionSummary;
use serde::Serialize;

/// Result of a pointer hit-test.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitTestResponse {
    pub ok: bool,
    pub hover_id: Option<String>,
    pub overlay_image: String,
    pub region: Option<RegionSummary>,
}

/// A rendered overlay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayResponse {
    pub ok: bool,
    pub overlay_image: String,
}

/// Current disabled-region ids.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisabledIdsResponse {
    pub ok: bool,
    pub disabled_ids: Vec<String>,
}
