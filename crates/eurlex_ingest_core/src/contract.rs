use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EventError, IngestError};

pub const CELLAR_ID_FIELD: &str = "cellarId";
pub const CREATED_FIELD: &str = "created";
pub const DOWNLOADED_FIELD: &str = "downloaded";
pub const OUTCOME_FIELD: &str = "outcome";
pub const ERROR_FIELD: &str = "error";
pub const UPSTREAM_STATUS_FIELD: &str = "upstreamStatus";

/// `strftime` layout of [`IngestionRecord::created`], e.g. `10/18/26 14:03:59`.
pub const CREATED_TIMESTAMP_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// Opaque identifier of a legal document in the Cellar repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellarId(String);

impl CellarId {
    pub fn parse(value: &str) -> Result<Self, EventError> {
        if value.trim().is_empty() {
            return Err(EventError::EmptyCellarId);
        }
        Ok(Self(value.to_string()))
    }

    /// Reads `cellarId` from a raw invocation event.
    pub fn from_event(event: &Value) -> Result<Self, EventError> {
        let object = event.as_object().ok_or(EventError::NotAnObject)?;
        let value = object
            .get(CELLAR_ID_FIELD)
            .ok_or(EventError::MissingCellarId)?;
        let text = value.as_str().ok_or(EventError::CellarIdNotString)?;
        Self::parse(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CellarId {
    type Error = EventError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CellarId> for String {
    fn from(cellar_id: CellarId) -> Self {
        cellar_id.0
    }
}

impl std::fmt::Display for CellarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterResponse {
    #[serde(rename = "cellarId")]
    pub cellar_id: CellarId,
    pub exists: bool,
}

/// Row written to the key-value store once a notice has been stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestionRecord {
    #[serde(rename = "cellarId")]
    pub cellar_id: CellarId,
    pub created: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutcomeError {
    pub kind: String,
    pub message: String,
}

impl From<&IngestError> for OutcomeError {
    fn from(error: &IngestError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.detail(),
        }
    }
}

/// Result of one downloader invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Notice uploaded and its record written (or already present).
    Stored { record_created: bool },
    /// The source answered with a non-200 status; nothing was written.
    Unavailable { status: u16 },
    Failed(IngestError),
}

impl DownloadOutcome {
    pub fn downloaded(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored { .. } => "stored",
            Self::Unavailable { .. } => "unavailable",
            Self::Failed(_) => "failed",
        }
    }

    /// Echoes `event` back with the outcome fields set. Fields left over from
    /// an earlier invocation of the same event are replaced.
    pub fn annotate_event(&self, mut event: Map<String, Value>) -> Value {
        event.remove(ERROR_FIELD);
        event.remove(UPSTREAM_STATUS_FIELD);
        event.insert(DOWNLOADED_FIELD.to_string(), Value::Bool(self.downloaded()));
        event.insert(
            OUTCOME_FIELD.to_string(),
            Value::String(self.as_str().to_string()),
        );

        match self {
            Self::Stored { .. } => {}
            Self::Unavailable { status } => {
                event.insert(UPSTREAM_STATUS_FIELD.to_string(), Value::from(*status));
            }
            Self::Failed(error) => {
                let error = serde_json::to_value(OutcomeError::from(error))
                    .expect("outcome error should serialize");
                event.insert(ERROR_FIELD.to_string(), error);
            }
        }

        Value::Object(event)
    }
}
