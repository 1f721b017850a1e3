use thiserror::Error;

#[derive(Error, Debug)]
pub enum GbotError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Media error: {0}")]
    Media(String),
}

pub type Result<T> = std::result::Result<T, GbotError>;
