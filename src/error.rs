use crate::schema::ReportFamily;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    #[error("No parsed financial records for {company} in the requested {family} window")]
    NoData {
        company: String,
        family: ReportFamily,
    },

    #[error("Invalid window size {0}: must be at least 1")]
    InvalidWindowSize(usize),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
