use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressionError {
    #[error("Unknown school: {0}")]
    UnknownSchool(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ProgressionError>;
