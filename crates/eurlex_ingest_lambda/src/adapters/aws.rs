use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_s3::primitives::ByteStream;
use eurlex_ingest_core::config::{IngestConfig, RecordWriteMode};
use eurlex_ingest_core::contract::{CellarId, IngestionRecord, CELLAR_ID_FIELD, CREATED_FIELD};

use crate::adapters::document_table::{DocumentTable, RecordWrite};
use crate::adapters::notice_source::{NoticeResponse, NoticeSource};
use crate::adapters::object_store::NoticeStore;

/// Shared SDK configuration, pointed at LocalStack when an endpoint override
/// is configured.
pub async fn load_sdk_config(config: &IngestConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(endpoint_url) = &config.aws_endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    loader.load().await
}

pub fn s3_client(sdk_config: &SdkConfig, config: &IngestConfig) -> aws_sdk_s3::Client {
    // LocalStack does not serve virtual-hosted bucket names.
    let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
        .force_path_style(config.aws_endpoint_url.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}

pub struct DynamoDocumentTable {
    table_name: String,
    client: aws_sdk_dynamodb::Client,
}

impl DynamoDocumentTable {
    pub fn new(sdk_config: &SdkConfig, table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            client: aws_sdk_dynamodb::Client::new(sdk_config),
        }
    }
}

impl DocumentTable for DynamoDocumentTable {
    fn record_exists(&self, cellar_id: &CellarId) -> Result<bool, String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let key = cellar_id.as_str().to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .get_item()
                    .table_name(table_name)
                    .key(CELLAR_ID_FIELD, AttributeValue::S(key))
                    .send()
                    .await
                    .map(|output| output.item().is_some())
                    .map_err(|error| {
                        format!(
                            "failed to read record from dynamodb: {}",
                            DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }

    fn put_record(
        &self,
        record: &IngestionRecord,
        mode: RecordWriteMode,
    ) -> Result<RecordWrite, String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let cellar_id = record.cellar_id.as_str().to_string();
        let created = record.created.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut request = client
                    .put_item()
                    .table_name(table_name)
                    .item(CELLAR_ID_FIELD, AttributeValue::S(cellar_id))
                    .item(CREATED_FIELD, AttributeValue::S(created));
                if mode == RecordWriteMode::IfAbsent {
                    request = request
                        .condition_expression("attribute_not_exists(#id)")
                        .expression_attribute_names("#id", CELLAR_ID_FIELD);
                }

                match request.send().await {
                    Ok(_) => Ok(RecordWrite::Inserted),
                    Err(error)
                        if error
                            .as_service_error()
                            .map(|service| service.is_conditional_check_failed_exception())
                            .unwrap_or(false) =>
                    {
                        Ok(RecordWrite::AlreadyPresent)
                    }
                    Err(error) => Err(format!(
                        "failed to write record to dynamodb: {}",
                        DisplayErrorContext(&error)
                    )),
                }
            })
        })
    }
}

pub struct S3NoticeStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl S3NoticeStore {
    pub fn new(s3_client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            s3_client,
        }
    }
}

impl NoticeStore for S3NoticeStore {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, String> {
        let bucket = self.bucket.clone();
        let prefix = prefix.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .list_objects_v2()
                    .bucket(bucket)
                    .prefix(prefix)
                    .send()
                    .await
                    .map(|output| {
                        output
                            .contents()
                            .iter()
                            .filter_map(|object| object.key())
                            .map(String::from)
                            .collect::<Vec<_>>()
                    })
                    .map_err(|error| {
                        format!(
                            "failed to list objects in s3: {}",
                            aws_sdk_s3::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }

    fn delete_object(&self, key: &str) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to delete object from s3: {}",
                            aws_sdk_s3::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }

    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to write object to s3: {}",
                            aws_sdk_s3::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}

/// EUR-Lex notice endpoint over plain HTTP GET.
pub struct HttpNoticeSource {
    http_client: reqwest::Client,
}

impl HttpNoticeSource {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpNoticeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeSource for HttpNoticeSource {
    fn fetch_notice(&self, url: &str) -> Result<NoticeResponse, String> {
        let client = self.http_client.clone();
        let url = url.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(request_notice(client, url))
        })
    }
}

async fn request_notice(client: reqwest::Client, url: String) -> Result<NoticeResponse, String> {
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|error| format!("failed to request notice {url}: {error}"))?;

    let status = response.status().as_u16();
    if status != 200 {
        return Ok(NoticeResponse {
            status,
            body: Vec::new(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|error| format!("failed to read notice body from {url}: {error}"))?;
    Ok(NoticeResponse {
        status,
        body: body.to_vec(),
    })
}
