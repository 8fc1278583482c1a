use eurlex_ingest_lambda::adapters::aws::{
    load_sdk_config, s3_client, DynamoDocumentTable, HttpNoticeSource, S3NoticeStore,
};
use eurlex_ingest_lambda::adapters::clock::LocalClock;
use eurlex_ingest_lambda::handlers::downloader::{handle_downloader_event, DownloaderConfig};
use eurlex_ingest_lambda::runtime::config::IngestConfig;
use lambda_runtime::{service_fn, tracing, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    tracing::debug!(payload = %event.payload, "incoming event");

    let config = IngestConfig::from_env()?;
    let downloader_config = DownloaderConfig::new(&config);

    let sdk_config = load_sdk_config(&config).await;
    let store = S3NoticeStore::new(s3_client(&sdk_config, &config), config.bucket_name.clone());
    let table = DynamoDocumentTable::new(&sdk_config, config.table_name.clone());
    let source = HttpNoticeSource::new();

    Ok(handle_downloader_event(
        event.payload,
        &downloader_config,
        &LocalClock,
        &source,
        &store,
        &table,
    )?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    lambda_runtime::run(service_fn(handle_request)).await
}
