use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "native")]
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} fetching {url}")]
    ContentStatus { url: String, status: u16 },

    #[error("Page markup error: {0}")]
    Markup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid easing curve: {0}")]
    InvalidEasing(String),

    #[error("Unsupported browser feature: {0}")]
    Unsupported(String),

    #[error("Page host error: {0}")]
    Host(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
