use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),

    #[error("ron parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("section '{0}' is not registered")]
    NotRegistered(&'static str),

    #[error("section '{0}' is already registered")]
    AlreadyRegistered(&'static str),

    #[error("invalid settings: {0}")]
    Invalid(&'static str),

    #[error("settings lock poisoned")]
    Poisoned,
}
