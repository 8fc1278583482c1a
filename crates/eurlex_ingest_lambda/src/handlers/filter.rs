use lambda_runtime::tracing;
use serde_json::Value;

use crate::adapters::document_table::DocumentTable;
use crate::runtime::contract::{CellarId, FilterResponse};
use crate::runtime::error::IngestError;

/// Reports whether `event.cellarId` already has an ingestion record.
///
/// Read-only. A malformed event or an unreachable table fails the invocation.
pub fn handle_filter_event(
    event: &Value,
    table: &impl DocumentTable,
) -> Result<FilterResponse, IngestError> {
    let cellar_id = CellarId::from_event(event)?;

    let exists = table
        .record_exists(&cellar_id)
        .map_err(IngestError::Store)?;

    tracing::info!(
        component = "existence_filter",
        cellar_id = %cellar_id,
        exists,
        "existence_checked"
    );

    Ok(FilterResponse { cellar_id, exists })
}
