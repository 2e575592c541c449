use thiserror::Error;

pub type HudeyResult<T> = Result<T, HudeyError>;

#[derive(Error, Debug)]
pub enum HudeyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Campaign fetch error: {0}")]
    Fetch(String),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for HudeyError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
