use thiserror::Error;

/// Rejections of a malformed invocation event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("invocation event must be a JSON object")]
    NotAnObject,
    #[error("invocation event is missing `cellarId`")]
    MissingCellarId,
    #[error("`cellarId` must be a string")]
    CellarIdNotString,
    #[error("`cellarId` cannot be empty")]
    EmptyCellarId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unsupported record write mode `{0}`, expected `overwrite` or `if_absent`")]
    RecordWriteMode(String),
}

/// Failures of a single ingestion step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error(transparent)]
    InvalidEvent(#[from] EventError),
    /// The remote notice source could not be reached or its body not read.
    #[error("network error: {0}")]
    Network(String),
    /// Blob store (notice objects) failure.
    #[error("storage error: {0}")]
    Storage(String),
    /// Key-value store (ingestion records) failure.
    #[error("store error: {0}")]
    Store(String),
}

impl IngestError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEvent(_) => "invalid_event",
            Self::Network(_) => "network",
            Self::Storage(_) => "storage",
            Self::Store(_) => "store",
        }
    }

    /// Message without the kind prefix that `Display` adds.
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidEvent(error) => error.to_string(),
            Self::Network(message) | Self::Storage(message) | Self::Store(message) => {
                message.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_wire_names() {
        assert_eq!(IngestError::Network("x".into()).kind(), "network");
        assert_eq!(IngestError::Storage("x".into()).kind(), "storage");
        assert_eq!(IngestError::Store("x".into()).kind(), "store");
        assert_eq!(
            IngestError::from(EventError::MissingCellarId).kind(),
            "invalid_event"
        );
    }

    #[test]
    fn detail_omits_kind_prefix() {
        let error = IngestError::Store("table eurlex_documents not found".into());
        assert_eq!(error.to_string(), "store error: table eurlex_documents not found");
        assert_eq!(error.detail(), "table eurlex_documents not found");
    }
}
