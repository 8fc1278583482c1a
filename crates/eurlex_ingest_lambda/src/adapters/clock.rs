use chrono::{Local, NaiveDateTime};
use eurlex_ingest_core::contract::CREATED_TIMESTAMP_FORMAT;

/// Wall clock consulted when an ingestion record is written.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    /// `now()` rendered for the record's `created` field.
    fn created_timestamp(&self) -> String {
        format_created_timestamp(&self.now())
    }
}

pub fn format_created_timestamp(at: &NaiveDateTime) -> String {
    at.format(CREATED_TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
