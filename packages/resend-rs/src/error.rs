use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResendError>;

#[derive(Debug, Error)]
pub enum ResendError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resend API error ({status}): {message}")]
    Api { status: u16, message: String },
}
