use eurlex_ingest_lambda::adapters::aws::{load_sdk_config, DynamoDocumentTable};
use eurlex_ingest_lambda::handlers::filter::handle_filter_event;
use eurlex_ingest_lambda::runtime::config::IngestConfig;
use eurlex_ingest_lambda::runtime::contract::FilterResponse;
use lambda_runtime::{service_fn, tracing, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<FilterResponse, Error> {
    tracing::debug!(payload = %event.payload, "incoming event");

    let config = IngestConfig::from_env()?;
    let sdk_config = load_sdk_config(&config).await;
    let table = DynamoDocumentTable::new(&sdk_config, config.table_name.clone());

    Ok(handle_filter_event(&event.payload, &table)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    lambda_runtime::run(service_fn(handle_request)).await
}
