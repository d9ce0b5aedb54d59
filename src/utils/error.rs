use crate::domain::model::{DirectionId, UniversityId};
use thiserror::Error;

/// Failure reported by a `RatingSource` for a single rating list.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The national ID does not appear in the list. Not a hard failure.
    #[error("national id is not listed in the rating list")]
    NotListed,

    #[error("rating list request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("rating list {url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse rating list {url}: {message}")]
    Parse { url: String, message: String },

    #[error("invalid rating list url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("error while parsing rating list of direction {direction_id} ({university}): {source}")]
    Source {
        direction_id: DirectionId,
        university: String,
        #[source]
        source: SourceError,
    },

    #[error("rating task for direction {direction_id} failed: {message}")]
    TaskFailed {
        direction_id: DirectionId,
        message: String,
    },

    #[error("expected {expected} direction outcomes, received {received}")]
    IncompleteFanIn { expected: usize, received: usize },
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn direction_not_found(id: DirectionId) -> Self {
        Self::NotFound {
            entity: "direction",
            id: u64::from(id.0),
        }
    }

    pub fn university_not_found(id: UniversityId) -> Self {
        Self::NotFound {
            entity: "university",
            id: u64::from(id.0),
        }
    }

    pub fn user_not_found(id: u64) -> Self {
        Self::NotFound { entity: "user", id }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("rating aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),
}

impl ServiceError {
    /// Message safe to show to an end user.
    pub fn user_friendly_message(&self) -> &'static str {
        match self {
            ServiceError::Repository(RepositoryError::NotFound { .. }) => {
                "The requested record does not exist"
            }
            ServiceError::Repository(_) => "Storage is unavailable, try again later",
            ServiceError::Aggregation(_) => {
                "Rating lists could not be loaded right now, try again later"
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("national id must contain exactly 11 digits, got {0:?}")]
    Format(String),

    #[error("national id {value} has control sum {actual}, expected {expected}")]
    Checksum {
        value: String,
        expected: u32,
        actual: u32,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ServiceError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
