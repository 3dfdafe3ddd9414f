use thiserror::Error;

/// Failures that end the dashboard process. Everything that happens inside
/// a session is reported as a notification instead.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid API url `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported API url scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error("invalid setting: {0}")]
    InvalidSetting(&'static str),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
