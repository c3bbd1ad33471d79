//! Annotation dataset model and the encrypted-file loader.
//!
//! The dataset is re-read and re-decrypted on every call to
//! [`load_annotation_dataset`]; nothing is cached between requests.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::{decrypt_payload, derive_key, EncryptionKey};
use crate::error::CoreError;

/// Minimum number of vertices for a boundary to take part in hit-testing
/// and rendering.
pub const MIN_POLYGON_VERTICES: usize = 3;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Pixel coordinate in the canonical canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPoint {
    pub x: f64,
    pub y: f64,
}

/// Implicitly closed polygon; the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<AnnotationPoint>,
}

/// One detected region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBoundary {
    pub polygon: Polygon,
    /// `[min_x, min_y, max_x, max_y]`, informational only.
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub iou: f64,
}

impl AnnotationBoundary {
    pub fn vertices(&self) -> &[AnnotationPoint] {
        &self.polygon.vertices
    }

    /// Whether the polygon has enough vertices to enclose an area.
    pub fn is_drawable(&self) -> bool {
        self.polygon.vertices.len() >= MIN_POLYGON_VERTICES
    }
}

/// Decrypted dataset. Region identity is the position in `boundaries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDataset {
    pub boundaries: Vec<AnnotationBoundary>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode decrypted plaintext into a typed dataset.
///
/// Fails with [`CoreError::DatasetInvalid`] when the text is not UTF-8 JSON,
/// lacks a `boundaries` array, or any boundary does not match the expected
/// shape.
pub fn decode_dataset(plaintext: &[u8]) -> Result<AnnotationDataset, CoreError> {
    let text = std::str::from_utf8(plaintext)
        .map_err(|e| CoreError::DatasetInvalid(format!("payload is not UTF-8: {e}")))?;

    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| CoreError::DatasetInvalid(format!("payload is not valid JSON: {e}")))?;

    match value.get("boundaries") {
        Some(serde_json::Value::Array(_)) => {}
        Some(_) => {
            return Err(CoreError::DatasetInvalid(
                "'boundaries' must be a JSON array".to_string(),
            ))
        }
        None => {
            return Err(CoreError::DatasetInvalid(
                "missing required key 'boundaries'".to_string(),
            ))
        }
    }

    serde_json::from_value(value)
        .map_err(|e| CoreError::DatasetInvalid(format!("malformed boundary: {e}")))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Where the encrypted dataset lives and how to unlock it.
#[derive(Clone)]
pub struct DatasetSource {
    /// Candidate paths, tried in order.
    pub candidates: Vec<PathBuf>,
    secret: Option<String>,
}

impl DatasetSource {
    pub fn new(candidates: Vec<PathBuf>, secret: Option<String>) -> Self {
        Self { candidates, secret }
    }

    /// Derive the key from the configured secret.
    pub fn key(&self) -> Result<EncryptionKey, CoreError> {
        derive_key(self.secret.as_deref())
    }

    pub fn has_secret(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl fmt::Debug for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetSource")
            .field("candidates", &self.candidates)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Read the first candidate file that exists.
pub async fn read_first_existing(candidates: &[PathBuf]) -> Result<(PathBuf, Vec<u8>), CoreError> {
    for path in candidates {
        match tokio::fs::read(path).await {
            Ok(bytes) => return Ok((path.clone(), bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Dataset candidate not present");
            }
            Err(e) => {
                return Err(CoreError::Internal(format!(
                    "failed to read dataset file {}: {e}",
                    path.display()
                )))
            }
        }
    }

    Err(CoreError::DatasetNotFound {
        candidates: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    })
}

/// Locate, decrypt and decode the annotation dataset.
pub async fn load_annotation_dataset(source: &DatasetSource) -> Result<AnnotationDataset, CoreError> {
    let key = source.key()?;
    let (path, payload) = read_first_existing(&source.candidates).await?;
    let dataset = decrypt_dataset(&path, &payload, &key)?;

    tracing::debug!(
        path = %path.display(),
        bytes = payload.len(),
        boundaries = dataset.boundaries.len(),
        key_fingerprint = %key.fingerprint(),
        "Annotation dataset loaded"
    );

    Ok(dataset)
}

fn decrypt_dataset(
    path: &Path,
    payload: &[u8],
    key: &EncryptionKey,
) -> Result<AnnotationDataset, CoreError> {
    let plaintext = decrypt_payload(payload, key).inspect_err(|err| {
        tracing::warn!(
            path = %path.display(),
            kind = err.kind(),
            key_fingerprint = %key.fingerprint(),
            "Dataset decryption failed"
        );
    })?;
    decode_dataset(&plaintext)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
