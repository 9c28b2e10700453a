use std::path::PathBuf;

pub type SpritemillResult<T> = Result<T, SpritemillError>;

#[derive(thiserror::Error, Debug)]
pub enum SpritemillError {
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("animation has no frames")]
    EmptyFrames,

    #[error("invalid source duration: {0}")]
    InvalidSourceDuration(String),

    #[error("missing file: '{}'", .0.display())]
    MissingFile(PathBuf),

    #[error("image download failed: '{url}' returned status {status}")]
    ImageDownload { url: String, status: u16 },

    #[error("external service error: {0}")]
    ExternalService(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpritemillError {
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    pub fn invalid_source_duration(msg: impl Into<String>) -> Self {
        Self::InvalidSourceDuration(msg.into())
    }

    pub fn missing_file(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile(path.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }
}
