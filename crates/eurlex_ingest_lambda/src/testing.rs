//! In-memory adapters for exercising the handlers without AWS or EUR-Lex.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use eurlex_ingest_core::config::RecordWriteMode;
use eurlex_ingest_core::contract::{CellarId, IngestionRecord};

use crate::adapters::clock::Clock;
use crate::adapters::document_table::{DocumentTable, RecordWrite};
use crate::adapters::notice_source::{NoticeResponse, NoticeSource};
use crate::adapters::object_store::NoticeStore;

#[derive(Default)]
pub struct InMemoryDocumentTable {
    records: Mutex<HashMap<CellarId, IngestionRecord>>,
    reads: Mutex<usize>,
    failure: Option<String>,
}

impl InMemoryDocumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table whose every call fails with `message`.
    pub fn unreachable(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn seed_record(&self, record: IngestionRecord) {
        self.records
            .lock()
            .expect("poisoned mutex")
            .insert(record.cellar_id.clone(), record);
    }

    pub fn record(&self, cellar_id: &str) -> Option<IngestionRecord> {
        let cellar_id = CellarId::parse(cellar_id).ok()?;
        self.records
            .lock()
            .expect("poisoned mutex")
            .get(&cellar_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("poisoned mutex").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().expect("poisoned mutex")
    }
}

impl DocumentTable for InMemoryDocumentTable {
    fn record_exists(&self, cellar_id: &CellarId) -> Result<bool, String> {
        if let Some(message) = &self.failure {
            return Err(message.clone());
        }
        *self.reads.lock().expect("poisoned mutex") += 1;
        Ok(self
            .records
            .lock()
            .expect("poisoned mutex")
            .contains_key(cellar_id))
    }

    fn put_record(
        &self,
        record: &IngestionRecord,
        mode: RecordWriteMode,
    ) -> Result<RecordWrite, String> {
        if let Some(message) = &self.failure {
            return Err(message.clone());
        }
        let mut records = self.records.lock().expect("poisoned mutex");
        if mode == RecordWriteMode::IfAbsent && records.contains_key(&record.cellar_id) {
            return Ok(RecordWrite::AlreadyPresent);
        }
        records.insert(record.cellar_id.clone(), record.clone());
        Ok(RecordWrite::Inserted)
    }
}

/// Ordered so that prefix listings are deterministic.
#[derive(Default)]
pub struct InMemoryNoticeStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    deleted: Mutex<Vec<String>>,
    denied_write_key: Option<String>,
}

impl InMemoryNoticeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes to `key`; other operations succeed.
    pub fn rejecting_writes_to(key: &str) -> Self {
        Self {
            denied_write_key: Some(key.to_string()),
            ..Self::default()
        }
    }

    pub fn seed_object(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), body.to_vec());
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .keys()
            .cloned()
            .collect()
    }

    pub fn body(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .get(key)
            .cloned()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().expect("poisoned mutex").clone()
    }
}

impl NoticeStore for InMemoryNoticeStore {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, String> {
        Ok(self
            .objects
            .lock()
            .expect("poisoned mutex")
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn delete_object(&self, key: &str) -> Result<(), String> {
        self.objects.lock().expect("poisoned mutex").remove(key);
        self.deleted
            .lock()
            .expect("poisoned mutex")
            .push(key.to_string());
        Ok(())
    }

    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        if self.denied_write_key.as_deref() == Some(key) {
            return Err(format!("simulated write failure for key: {key}"));
        }
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), body.to_vec());
        Ok(())
    }
}

/// Notice source answering every request with the same scripted result.
pub struct ScriptedNoticeSource {
    response: Result<NoticeResponse, String>,
    requested_urls: Mutex<Vec<String>>,
}

impl ScriptedNoticeSource {
    pub fn ok(body: &[u8]) -> Self {
        Self::with_response(Ok(NoticeResponse {
            status: 200,
            body: body.to_vec(),
        }))
    }

    pub fn status(status: u16) -> Self {
        Self::with_response(Ok(NoticeResponse {
            status,
            body: Vec::new(),
        }))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_response(Err(message.to_string()))
    }

    fn with_response(response: Result<NoticeResponse, String>) -> Self {
        Self {
            response,
            requested_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested_urls.lock().expect("poisoned mutex").clone()
    }
}

impl NoticeSource for ScriptedNoticeSource {
    fn fetch_notice(&self, url: &str) -> Result<NoticeResponse, String> {
        self.requested_urls
            .lock()
            .expect("poisoned mutex")
            .push(url.to_string());
        self.response.clone()
    }
}

/// Clock that only moves when told to. Starts at 2026-10-18 14:03:59.
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().expect("poisoned mutex") += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|date| date.and_hms_opt(14, 3, 59))
            .expect("valid start time");
        Self::at(start)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("poisoned mutex")
    }
}

/// Notice source that lets `delay` pass on `clock` before answering, the way
/// a slow upstream would.
pub struct SlowNoticeSource<'a> {
    inner: ScriptedNoticeSource,
    clock: &'a ManualClock,
    delay: Duration,
}

impl<'a> SlowNoticeSource<'a> {
    pub fn new(inner: ScriptedNoticeSource, clock: &'a ManualClock, delay: Duration) -> Self {
        Self {
            inner,
            clock,
            delay,
        }
    }
}

impl NoticeSource for SlowNoticeSource<'_> {
    fn fetch_notice(&self, url: &str) -> Result<NoticeResponse, String> {
        self.clock.advance(self.delay);
        self.inner.fetch_notice(url)
    }
}
