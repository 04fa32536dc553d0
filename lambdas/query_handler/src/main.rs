use lambda_http::{run, service_fn, tracing};
use lambda_http::{Body, Error, Request, Response};
use chatbot_core::aws::DynamoLogTable;
use chatbot_core::store::LogTable;
use chatbot_core::upstream::{HttpApis, JokeApi, WeatherApi};
use chatbot_core::{QueryConfig, QueryHandler, QueryRequest};

async fn function_handler<W, J, T>(handler: &QueryHandler<W, J, T>, event: Request) -> Result<Response<Body>, Error>
where
    W: WeatherApi,
    J: JokeApi,
    T: LogTable,
{
    let request = QueryRequest::from_body(event.body().as_ref())?;

    let answer = handler.handle(&request.query).await?;

    let body = serde_json::to_string(&answer)?;

    Ok(Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(body.into())?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = QueryConfig::from_env()?;
    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let apis = HttpApis::from_config(&config);
    let table = DynamoLogTable::new(aws_sdk_dynamodb::Client::new(&aws), &config.table_name);
    let handler = QueryHandler::new(apis.clone(), apis, table);

    run(service_fn(|event| function_handler(&handler, event))).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chatbot_core::store::MemoryLogTable;

    use super::*;

    fn handler(table: Arc<MemoryLogTable>) -> QueryHandler<HttpApis, HttpApis, Arc<MemoryLogTable>> {
        // nothing listens here, so upstream calls fail fast
        let apis = HttpApis::new(
            "http://127.0.0.1:1/weather".to_string(),
            "key".to_string(),
            "http://127.0.0.1:1/joke".to_string(),
        );
        QueryHandler::new(apis.clone(), apis, table)
    }

    #[tokio::test]
    async fn unknown_query_returns_empty_json() {
        let table = Arc::new(MemoryLogTable::new());
        let event = Request::new(Body::from(r#"{"query": "good morning"}"#));

        let response = function_handler(&handler(table.clone()), event).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body: &[u8] = response.body().as_ref();
        assert_eq!(body, b"{}");

        let records = table.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query, "good morning");
        assert_eq!(records[0].response, "{}");
    }

    #[tokio::test]
    async fn unreachable_upstream_fails_invocation() {
        let table = Arc::new(MemoryLogTable::new());
        let event = Request::new(Body::from(r#"{"query": "tell me a joke"}"#));

        assert!(function_handler(&handler(table.clone()), event).await.is_err());
        assert!(table.records().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_fails_invocation() {
        let table = Arc::new(MemoryLogTable::new());
        let event = Request::new(Body::from("not json"));

        assert!(function_handler(&handler(table.clone()), event).await.is_err());
        assert!(table.records().await.is_empty());
    }
}
