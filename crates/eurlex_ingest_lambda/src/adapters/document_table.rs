use eurlex_ingest_core::config::RecordWriteMode;
use eurlex_ingest_core::contract::{CellarId, IngestionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordWrite {
    Inserted,
    /// `RecordWriteMode::IfAbsent` found an existing record and left it alone.
    AlreadyPresent,
}

/// Key-value table of ingested notices, keyed by cellar id.
pub trait DocumentTable {
    fn record_exists(&self, cellar_id: &CellarId) -> Result<bool, String>;

    fn put_record(
        &self,
        record: &IngestionRecord,
        mode: RecordWriteMode,
    ) -> Result<RecordWrite, String>;
}
