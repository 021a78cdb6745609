//! Error types for screengrab-capture.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Browser failed: {0}")]
    BrowserFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Dev server failed: {0}")]
    DevServerFailed(String),

    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that end a run even when raised inside the capture loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::OutputDir { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
