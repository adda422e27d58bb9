use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cocosample operations.
#[derive(Debug, Error)]
pub enum CocoSampleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse sampler config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unrecognized category selection: {0}")]
    InvalidSelection(String),

    #[error("Failed to decode mask for annotation {annotation_id}: {message}")]
    MaskDecode { annotation_id: u64, message: String },

    #[error("Failed to write mask to {path}: {source}")]
    MaskWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    ImageCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid output tree at {path}: {message}")]
    OutputTree { path: PathBuf, message: String },
}
