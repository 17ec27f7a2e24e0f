use thiserror::Error;

pub type TicketResult<T> = std::result::Result<T, TicketError>;

#[derive(Error, Debug)]
pub enum TicketError {
    /// One or more required fields are blank. Carries the human-readable labels.
    #[error("Missing required fields: Please fill out: {}", labels.join(", "))]
    Validation { labels: Vec<String> },

    #[error("ticket not found: {0}")]
    NotFound(String),

    #[error("invalid ticket name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Persistence(#[from] opendal::Error),

    #[error("ticket {name} is not a valid JSON object of strings: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize ticket: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TicketError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TicketError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TicketError::Validation { .. })
    }
}
