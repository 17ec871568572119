use thiserror::Error;
use utf8dec::{UnknownStrategy, check::CheckError};

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("unknown option '{0}'")]
    UnknownFlag(String),
    #[error("option '{0}' needs a value")]
    MissingValue(&'static str),
    #[error("invalid value '{value}' for '{flag}'")]
    InvalidValue { flag: &'static str, value: String },
    #[error(transparent)]
    UnknownStrategy(#[from] UnknownStrategy),
    #[error(transparent)]
    Check(#[from] CheckError),
    #[error("{label} reported {errors} errors on a well-formed fixture")]
    DecodeErrors { label: String, errors: u64 },
    #[error("{failed} checks failed")]
    Failed { failed: usize },
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
