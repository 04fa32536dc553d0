use chrono::{NaiveDate, Utc};
use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use chatbot_core::aws::{DynamoLogTable, S3ObjectStore};
use chatbot_core::store::{LogTable, ObjectStore};
use chatbot_core::{ExportConfig, LogExporter};

/// Scheduled events carry no usable payload; `date` is only set for a
/// manual backfill.
#[derive(Deserialize, Debug, Default)]
struct ExportRequest {
    #[serde(default)]
    date: Option<NaiveDate>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ExportResponse {
    status_code: u16,
    body: String,
}

async fn function_handler<T, S>(exporter: &LogExporter<T, S>, event: LambdaEvent<serde_json::Value>) -> Result<ExportResponse, Error>
where
    T: LogTable,
    S: ObjectStore,
{
    let request = match event.payload {
        serde_json::Value::Null => ExportRequest::default(),
        payload => serde_json::from_value::<ExportRequest>(payload)?,
    };

    let summary = match request.date {
        Some(day) => exporter.export_day(day).await?,
        None => exporter.export_previous_day(Utc::now()).await?,
    };

    Ok(ExportResponse {
        status_code: 200,
        body: summary.message(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = ExportConfig::from_env()?;
    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let table = DynamoLogTable::new(aws_sdk_dynamodb::Client::new(&aws), &config.table_name);
    let store = S3ObjectStore::new(aws_sdk_s3::Client::new(&aws), &config.bucket_name);
    let exporter = LogExporter::new(table, store);

    run(service_fn(|event| function_handler(&exporter, event))).await
}
