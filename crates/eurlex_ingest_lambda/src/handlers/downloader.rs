use std::time::Instant;

use lambda_runtime::tracing;
use serde_json::Value;

use crate::adapters::clock::Clock;
use crate::adapters::document_table::{DocumentTable, RecordWrite};
use crate::adapters::notice_source::NoticeSource;
use crate::adapters::object_store::NoticeStore;
use crate::runtime::config::{IngestConfig, RecordWriteMode};
use crate::runtime::contract::{CellarId, DownloadOutcome, IngestionRecord};
use crate::runtime::error::{EventError, IngestError};
use crate::runtime::storage_keys::{notice_download_url, notice_object_key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    pub notice_host: String,
    pub record_write_mode: RecordWriteMode,
}

impl DownloaderConfig {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            notice_host: config.notice_host.clone(),
            record_write_mode: config.record_write_mode,
        }
    }
}

/// Downloads the notice named by `event.cellarId` and echoes the event back
/// with `downloaded`, `outcome` and, when relevant, `error` or
/// `upstreamStatus` set.
///
/// Only a malformed event is returned as `Err`; download and storage failures
/// are reported inside the echoed event. `clock` stamps the record's `created`
/// field at the moment it is written.
pub fn handle_downloader_event(
    event: Value,
    config: &DownloaderConfig,
    clock: &impl Clock,
    source: &impl NoticeSource,
    store: &impl NoticeStore,
    table: &impl DocumentTable,
) -> Result<Value, IngestError> {
    let cellar_id = CellarId::from_event(&event)?;
    let Value::Object(fields) = event else {
        return Err(EventError::NotAnObject.into());
    };

    let outcome = ingest_notice(&cellar_id, config, clock, source, store, table);
    Ok(outcome.annotate_event(fields))
}

pub fn ingest_notice(
    cellar_id: &CellarId,
    config: &DownloaderConfig,
    clock: &impl Clock,
    source: &impl NoticeSource,
    store: &impl NoticeStore,
    table: &impl DocumentTable,
) -> DownloadOutcome {
    let started_at = Instant::now();
    let url = notice_download_url(&config.notice_host, cellar_id);
    tracing::info!(
        component = "metadata_downloader",
        cellar_id = %cellar_id,
        url = %url,
        "notice_download_started"
    );

    let outcome = download_and_store(cellar_id, &url, config, clock, source, store, table)
        .unwrap_or_else(DownloadOutcome::Failed);
    let duration_ms = started_at.elapsed().as_millis() as u64;

    match &outcome {
        DownloadOutcome::Stored { record_created } => tracing::info!(
            component = "metadata_downloader",
            cellar_id = %cellar_id,
            record_created = *record_created,
            duration_ms,
            "notice_stored"
        ),
        DownloadOutcome::Unavailable { status } => tracing::warn!(
            component = "metadata_downloader",
            cellar_id = %cellar_id,
            upstream_status = *status,
            duration_ms,
            "notice_unavailable"
        ),
        DownloadOutcome::Failed(error) => tracing::error!(
            component = "metadata_downloader",
            cellar_id = %cellar_id,
            error_kind = error.kind(),
            error = %error,
            duration_ms,
            "notice_ingest_failed"
        ),
    }

    outcome
}

fn download_and_store(
    cellar_id: &CellarId,
    url: &str,
    config: &DownloaderConfig,
    clock: &impl Clock,
    source: &impl NoticeSource,
    store: &impl NoticeStore,
    table: &impl DocumentTable,
) -> Result<DownloadOutcome, IngestError> {
    let response = source.fetch_notice(url).map_err(IngestError::Network)?;
    if !response.is_success() {
        return Ok(DownloadOutcome::Unavailable {
            status: response.status,
        });
    }

    let object_key = notice_object_key(cellar_id);
    replace_object(store, &object_key, &response.body)?;

    let record = IngestionRecord {
        cellar_id: cellar_id.clone(),
        created: clock.created_timestamp(),
    };
    // The uploaded object stays in place when this write fails.
    let write = table
        .put_record(&record, config.record_write_mode)
        .map_err(IngestError::Store)?;

    Ok(DownloadOutcome::Stored {
        record_created: write == RecordWrite::Inserted,
    })
}

/// Deletes every object stored under exactly `key`, then uploads `body`.
fn replace_object(store: &impl NoticeStore, key: &str, body: &[u8]) -> Result<(), IngestError> {
    let existing = store.list_keys(key).map_err(IngestError::Storage)?;

    for existing_key in existing.iter().filter(|existing_key| existing_key.as_str() == key) {
        tracing::info!(
            component = "metadata_downloader",
            object_key = %existing_key,
            "notice_object_replaced"
        );
        store
            .delete_object(existing_key)
            .map_err(IngestError::Storage)?;
    }

    store
        .write_object(key, body)
        .map_err(IngestError::Storage)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::testing::{
        InMemoryDocumentTable, InMemoryNoticeStore, ManualClock, ScriptedNoticeSource,
        SlowNoticeSource,
    };

    fn sample_config() -> DownloaderConfig {
        DownloaderConfig::new(&IngestConfig::default())
    }

    #[test]
    fn stores_notice_and_records_ingestion() {
        let source = ScriptedNoticeSource::ok(b"<xml/>");
        let store = InMemoryNoticeStore::new();
        let table = InMemoryDocumentTable::new();

        let output = handle_downloader_event(
            json!({"cellarId": "xyz"}),
            &sample_config(),
            &ManualClock::default(),
            &source,
            &store,
            &table,
        )
        .expect("downloader should answer");

        assert_eq!(
            output,
            json!({"cellarId": "xyz", "downloaded": true, "outcome": "stored"})
        );
        assert_eq!(store.keys(), vec!["notice_xyz.xml".to_string()]);
        assert_eq!(store.body("notice_xyz.xml"), Some(b"<xml/>".to_vec()));

        let record = table.record("xyz").expect("record should be written");
        assert_eq!(record.created, "10/18/26 14:03:59");
        assert_eq!(
            source.requested_urls(),
            vec![
                "https://eur-lex.europa.eu/download-notice.html?legalContentId=cellar:xyz&noticeType=branch&callingUrl=&lng=EN"
                    .to_string()
            ]
        );
    }

    #[test]
    fn created_is_taken_when_the_record_is_written() {
        let clock = ManualClock::default();
        let source = SlowNoticeSource::new(
            ScriptedNoticeSource::ok(b"<xml/>"),
            &clock,
            Duration::seconds(2),
        );
        let store = InMemoryNoticeStore::new();
        let table = InMemoryDocumentTable::new();

        handle_downloader_event(
            json!({"cellarId": "xyz"}),
            &sample_config(),
            &clock,
            &source,
            &store,
            &table,
        )
        .expect("downloader should answer");

        let record = table.record("xyz").expect("record should be written");
        assert_eq!(record.created, "10/18/26 14:04:01");
    }

    #[test]
    fn replaces_existing_object_under_the_same_key() {
        let source = ScriptedNoticeSource::ok(b"<notice v=\"2\"/>");
        let store = InMemoryNoticeStore::new();
        store.seed_object("notice_xyz.xml", b"<notice v=\"1\"/>");
        let table = InMemoryDocumentTable::new();

        handle_downloader_event(
            json!({"cellarId": "xyz"}),
            &sample_config(),
            &ManualClock::default(),
            &source,
            &store,
            &table,
        )
        .expect("downloader should answer");

        assert_eq!(store.deleted_keys(), vec!["notice_xyz.xml".to_string()]);
        assert_eq!(store.keys(), vec!["notice_xyz.xml".to_string()]);
        assert_eq!(
            store.body("notice_xyz.xml"),
            Some(b"<notice v=\"2\"/>".to_vec())
        );
    }

    #[test]
    fn leaves_objects_sharing_only_a_prefix() {
        let source = ScriptedNoticeSource::ok(b"<xml/>");
        let store = InMemoryNoticeStore::new();
        store.seed_object("notice_xyz.xml.bak", b"backup");
        let table = InMemoryDocumentTable::new();

        handle_downloader_event(
            json!({"cellarId": "xyz"}),
            &sample_config(),
            &ManualClock::default(),
            &source,
            &store,
            &table,
        )
        .expect("downloader should answer");

        assert!(store.deleted_keys().is_empty());
        assert_eq!(store.body("notice_xyz.xml.bak"), Some(b"backup".to_vec()));
    }

    #[test]
    fn network_failure_reports_error_without_side_effects() {
        let source = ScriptedNoticeSource::failing("dns error: eur-lex.europa.eu");
        let store = InMemoryNoticeStore::new();
        let table = InMemoryDocumentTable::new();

        let output = handle_downloader_event(
            json!({"cellarId": "xyz"}),
            &sample_config(),
            &ManualClock::default(),
            &source,
            &store,
            &table,
        )
        .expect("downloader should answer");

        assert_eq!(output["downloaded"], json!(false));
        assert_eq!(output["outcome"], json!("failed"));
        assert_eq!(
            output["error"],
            json!({"kind": "network", "message": "dns error: eur-lex.europa.eu"})
        );
        assert!(store.keys().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn non_200_response_is_reported_as_unavailable() {
        let source = ScriptedNoticeSource::status(404);
        let store = InMemoryNoticeStore::new();
        let table = InMemoryDocumentTable::new();

        let output = handle_downloader_event(
            json!({"cellarId": "missing"}),
            &sample_config(),
            &ManualClock::default(),
            &source,
            &store,
            &table,
        )
        .expect("downloader should answer");

        assert_eq!(
            output,
            json!({
                "cellarId": "missing",
                "downloaded": false,
                "outcome": "unavailable",
                "upstreamStatus": 404,
            })
        );
        assert!(store.keys().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn upload_failure_skips_record_write() {
        let source = ScriptedNoticeSource::ok(b"<xml/>");
        let store = InMemoryNoticeStore::rejecting_writes_to("notice_xyz.xml");
        let table = InMemoryDocumentTable::new();

        let output = handle_downloader_event(
            json!({"cellarId": "xyz"}),
            &sample_config(),
            &ManualClock::default(),
            &source,
            &store,
            &table,
        )
        .expect("downloader should answer");

        assert_eq!(output["error"]["kind"], json!("storage"));
        assert!(table.is_empty());
    }

    #[test]
    fn record_failure_leaves_uploaded_object_in_place() {
        let source = ScriptedNoticeSource::ok(b"<xml/>");
        let store = InMemoryNoticeStore::new();
        let table = InMemoryDocumentTable::unreachable("ResourceNotFoundException");

        let output = handle_downloader_event(
            json!({"cellarId": "xyz"}),
            &sample_config(),
            &ManualClock::default(),
            &source,
            &store,
            &table,
        )
        .expect("downloader should answer");

        assert_eq!(output["downloaded"], json!(false));
        assert_eq!(
            output["error"],
            json!({"kind": "store", "message": "ResourceNotFoundException"})
        );
        assert_eq!(store.body("notice_xyz.xml"), Some(b"<xml/>".to_vec()));
    }

    #[test]
    fn if_absent_mode_keeps_first_record() {
        let source = ScriptedNoticeSource::ok(b"<xml/>");
        let store = InMemoryNoticeStore::new();
        let table = InMemoryDocumentTable::new();
        table.seed_record(IngestionRecord {
            cellar_id: CellarId::parse("xyz").expect("valid id"),
            created: "01/02/26 03:04:05".to_string(),
        });
        let config = DownloaderConfig {
            record_write_mode: RecordWriteMode::IfAbsent,
            ..sample_config()
        };

        let cellar_id = CellarId::parse("xyz").expect("valid id");
        let clock = ManualClock::default();
        let outcome = ingest_notice(&cellar_id, &config, &clock, &source, &store, &table);

        assert_eq!(
            outcome,
            DownloadOutcome::Stored {
                record_created: false
            }
        );
        assert_eq!(
            table.record("xyz").expect("record should remain").created,
            "01/02/26 03:04:05"
        );
    }

    #[test]
    fn missing_identifier_fails_before_any_request() {
        let source = ScriptedNoticeSource::ok(b"<xml/>");
        let store = InMemoryNoticeStore::new();
        let table = InMemoryDocumentTable::new();

        let error = handle_downloader_event(
            json!({"notice": "xyz"}),
            &sample_config(),
            &ManualClock::default(),
            &source,
            &store,
            &table,
        )
        .expect_err("missing cellarId should fail");

        assert_eq!(error, IngestError::InvalidEvent(EventError::MissingCellarId));
        assert!(source.requested_urls().is_empty());
    }
}
