//! Request extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` extractor whose rejections render through [`AppError`], so a
/// malformed body gets the same `{ "ok": false, ... }` shape as every other
/// failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
