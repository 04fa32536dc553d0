use std::sync::Arc;
use axum::{body::Bytes, extract::Query, response::IntoResponse, routing::post, Extension, Json, Router};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use dotenvy::dotenv;
use serde::Deserialize;
use tower_http::cors::{CorsLayer, Any};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use chatbot_core::aws::{DynamoLogTable, S3ObjectStore};
use chatbot_core::store::{LogTable, MemoryLogTable, MemoryObjectStore, ObjectStore};
use chatbot_core::upstream::HttpApis;
use chatbot_core::{ExportConfig, LogExporter, QueryConfig, QueryHandler, QueryRequest};


type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

type SharedQueryHandler = Arc<QueryHandler<HttpApis, HttpApis, Arc<dyn LogTable>>>;
type SharedExporter = Arc<LogExporter<Arc<dyn LogTable>, Arc<dyn ObjectStore>>>;


#[tokio::main]
async fn main() -> Result<(), GenericError> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let query_config = QueryConfig::from_env()?;
    let apis = HttpApis::from_config(&query_config);

    let (table, store): (Arc<dyn LogTable>, Arc<dyn ObjectStore>) =
        if std::env::var("STORAGE").as_deref() == Ok("memory") {
            info!("using in-memory table and object store");
            (Arc::new(MemoryLogTable::new()), Arc::new(MemoryObjectStore::new()))
        } else {
            let export_config = ExportConfig::from_env()?;
            let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            (
                Arc::new(DynamoLogTable::new(aws_sdk_dynamodb::Client::new(&aws), &query_config.table_name)),
                Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&aws), &export_config.bucket_name)),
            )
        };

    let handler = Arc::new(QueryHandler::new(apis.clone(), apis, table.clone()));
    let exporter = Arc::new(LogExporter::new(table, store));

    let addr = std::env::var("DEV_SERVER_ADDR").unwrap_or_else(|_| "localhost:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(handler, exporter)).await?;

    Ok(())
}

fn app(handler: SharedQueryHandler, exporter: SharedExporter) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/query", post(post_query))
        .route("/export", post(post_export))
        .layer(cors)
        .layer(Extension(handler))
        .layer(Extension(exporter))
}

async fn post_query(Extension(handler): Extension<SharedQueryHandler>, body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let request = QueryRequest::from_body(&body)?;
    let answer = handler.handle(&request.query).await?;
    Ok(Json(answer))
}

#[derive(Deserialize, Debug)]
struct ExportParams {
    date: Option<NaiveDate>,
}

async fn post_export(Extension(exporter): Extension<SharedExporter>, Query(params): Query<ExportParams>) -> Result<impl IntoResponse, ApiError> {
    let summary = match params.date {
        Some(day) => exporter.export_day(day).await?,
        None => exporter.export_previous_day(Utc::now()).await?,
    };
    Ok(Json(summary))
}


pub struct ApiError(pub chatbot_core::Error);

impl From<chatbot_core::Error> for ApiError {
    fn from(err: chatbot_core::Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        error!("->> {}", self.0);

        let body = Json(serde_json::json!({
            "error": self.0.to_string()
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
