use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreloadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSS parse error in {sheet}: {message}")]
    InvalidCss { sheet: String, message: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] serde_yaml_ng::Error),

    #[error("Could not fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Could not build loader thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, PreloadError>;
