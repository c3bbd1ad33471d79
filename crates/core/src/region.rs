//! Region identifiers.
//!
//! A region is named after its 1-based position in the dataset:
//! `boundaries[i]` is `"region-{i+1}"`. Hit-testing and overlay rendering
//! both go through these helpers so the convention lives in one place.

use crate::dataset::{AnnotationBoundary, AnnotationDataset};
use crate::error::CoreError;

/// Prefix shared by every region id.
pub const REGION_ID_PREFIX: &str = "region-";

/// Region id for the boundary at 0-based `index`.
pub fn region_id(index: usize) -> String {
    format!("{REGION_ID_PREFIX}{}", index + 1)
}

/// Display label for the boundary at 0-based `index`.
pub fn region_label(index: usize) -> String {
    format!("領域 {}", index + 1)
}

/// Parse a region id into its 0-based index.
///
/// Returns `None` for anything other than the canonical `region-{n}` with
/// `n >= 1`. Leading zeros are rejected so each region has exactly one id.
pub fn parse_region_id(id: &str) -> Option<usize> {
    let digits = id.strip_prefix(REGION_ID_PREFIX)?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: usize = digits.parse().ok()?;
    n.checked_sub(1)
}

/// Validate that `id` is a well-formed region id.
pub fn validate_region_id(id: &str) -> Result<(), CoreError> {
    match parse_region_id(id) {
        Some(_) => Ok(()),
        None => Err(CoreError::Validation(format!(
            "Invalid region id '{id}'. Expected '{REGION_ID_PREFIX}<n>' with n >= 1"
        ))),
    }
}

/// Resolve a region id against the dataset.
pub fn get_boundary_by_id<'a>(
    dataset: &'a AnnotationDataset,
    id: &str,
) -> Option<&'a AnnotationBoundary> {
    parse_region_id(id).and_then(|index| dataset.boundaries.get(index))
}
