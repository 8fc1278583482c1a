use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_TABLE_NAME: &str = "eurlex_documents";
pub const DEFAULT_BUCKET_NAME: &str = "notices-bucket";
pub const DEFAULT_NOTICE_HOST: &str = "https://eur-lex.europa.eu";
pub const LOCALSTACK_EDGE_PORT: u16 = 4566;

pub const TABLE_NAME_VAR: &str = "INGEST_DYNAMODB_TABLE_NAME";
pub const BUCKET_NAME_VAR: &str = "INGEST_S3_BUCKET_NAME";
pub const LOCALSTACK_HOSTNAME_VAR: &str = "LOCALSTACK_HOSTNAME";
pub const NOTICE_HOST_VAR: &str = "INGEST_NOTICE_HOST";
pub const RECORD_WRITE_MODE_VAR: &str = "INGEST_RECORD_WRITE_MODE";

/// How the downloader writes the ingestion record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordWriteMode {
    /// Unconditional put; a repeated ingestion replaces the record.
    #[default]
    Overwrite,
    /// Conditional put that keeps the first record for an identifier.
    IfAbsent,
}

impl FromStr for RecordWriteMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "if_absent" | "if-absent" => Ok(Self::IfAbsent),
            _ => Err(ConfigError::RecordWriteMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub table_name: String,
    pub bucket_name: String,
    /// Endpoint override for DynamoDB and S3, set for LocalStack runs.
    pub aws_endpoint_url: Option<String>,
    pub notice_host: String,
    pub record_write_mode: RecordWriteMode,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            bucket_name: DEFAULT_BUCKET_NAME.to_string(),
            aws_endpoint_url: None,
            notice_host: DEFAULT_NOTICE_HOST.to_string(),
            record_write_mode: RecordWriteMode::default(),
        }
    }
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from `lookup`; unset or blank variables fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let record_write_mode = match read(RECORD_WRITE_MODE_VAR) {
            Some(value) => value.parse()?,
            None => defaults.record_write_mode,
        };

        Ok(Self {
            table_name: read(TABLE_NAME_VAR).unwrap_or(defaults.table_name),
            bucket_name: read(BUCKET_NAME_VAR).unwrap_or(defaults.bucket_name),
            aws_endpoint_url: read(LOCALSTACK_HOSTNAME_VAR)
                .map(|host| format!("http://{host}:{LOCALSTACK_EDGE_PORT}")),
            notice_host: read(NOTICE_HOST_VAR).unwrap_or(defaults.notice_host),
            record_write_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = IngestConfig::from_lookup(lookup_from(&[])).expect("config should load");
        assert_eq!(config, IngestConfig::default());
        assert_eq!(config.table_name, "eurlex_documents");
        assert_eq!(config.bucket_name, "notices-bucket");
        assert_eq!(config.aws_endpoint_url, None);
    }

    #[test]
    fn localstack_hostname_sets_edge_endpoint() {
        let config = IngestConfig::from_lookup(lookup_from(&[(
            LOCALSTACK_HOSTNAME_VAR,
            "localstack",
        )]))
        .expect("config should load");
        assert_eq!(
            config.aws_endpoint_url.as_deref(),
            Some("http://localstack:4566")
        );
    }

    #[test]
    fn overrides_names_and_write_mode() {
        let config = IngestConfig::from_lookup(lookup_from(&[
            (TABLE_NAME_VAR, "documents-dev"),
            (BUCKET_NAME_VAR, "notices-dev"),
            (NOTICE_HOST_VAR, "http://127.0.0.1:9000"),
            (RECORD_WRITE_MODE_VAR, "if_absent"),
        ]))
        .expect("config should load");

        assert_eq!(config.table_name, "documents-dev");
        assert_eq!(config.bucket_name, "notices-dev");
        assert_eq!(config.notice_host, "http://127.0.0.1:9000");
        assert_eq!(config.record_write_mode, RecordWriteMode::IfAbsent);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = IngestConfig::from_lookup(lookup_from(&[(TABLE_NAME_VAR, "  ")]))
            .expect("config should load");
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
    }

    #[test]
    fn rejects_unknown_write_mode() {
        let error = IngestConfig::from_lookup(lookup_from(&[(RECORD_WRITE_MODE_VAR, "merge")]))
            .expect_err("unknown mode should fail");
        assert_eq!(error, ConfigError::RecordWriteMode("merge".to_string()));
    }
}
