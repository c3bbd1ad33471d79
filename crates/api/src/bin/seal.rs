//! Encrypt a plaintext annotation dataset for deployment.
//!
//! ```text
//! roiview-seal <input.json> <output.enc>
//! ```
//!
//! The key comes from `ANNOTATION_DATASET_KEY` (or the development key when
//! unset), exactly as the server resolves it. The input is decoded as a
//! dataset first so a malformed file is never sealed.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roiview_core::crypto::{decrypt_payload, derive_key, seal_payload};
use roiview_core::dataset::decode_dataset;
use roiview_core::error::CoreError;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roiview_seal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [input, output] = args.as_slice() else {
        eprintln!("usage: roiview-seal <input.json> <output.enc>");
        return ExitCode::from(2);
    };

    match seal(PathBuf::from(input), PathBuf::from(output)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "Sealing failed");
            ExitCode::FAILURE
        }
    }
}

async fn seal(input: PathBuf, output: PathBuf) -> Result<(), CoreError> {
    let secret = std::env::var("ANNOTATION_DATASET_KEY").ok();
    let key = derive_key(secret.as_deref())?;
    if key.is_dev_key() {
        tracing::warn!("ANNOTATION_DATASET_KEY not set, sealing with the insecure development key");
    }

    let plaintext = tokio::fs::read(&input)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to read {}: {e}", input.display())))?;
    let dataset = decode_dataset(&plaintext)?;

    let sealed = seal_payload(&plaintext, &key)?;
    // Round-trip check before touching the output file.
    if decrypt_payload(&sealed, &key)? != plaintext {
        return Err(CoreError::Internal("sealed payload failed verification".to_string()));
    }

    tokio::fs::write(&output, &sealed)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to write {}: {e}", output.display())))?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        boundaries = dataset.boundaries.len(),
        bytes = sealed.len(),
        key_fingerprint = %key.fingerprint(),
        "Dataset sealed"
    );
    Ok(())
}
