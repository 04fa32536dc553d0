use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_s3::primitives::ByteStream;
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, from_items, to_item};

use crate::error::Result;
use crate::record::LogRecord;
use crate::store::{LogTable, ObjectStore, ScanPage};

const PREFIX_FILTER: &str = "begins_with(QueryId, :date_prefix)";

#[derive(Debug, Clone)]
pub struct DynamoLogTable {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoLogTable {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self { client, table_name: table_name.into() }
    }
}

/// Primary key of the table, used as the scan's `ExclusiveStartKey`.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct RecordKey {
    query_id: String,
}

#[async_trait]
impl LogTable for DynamoLogTable {
    async fn put_record(&self, record: &LogRecord) -> Result<()> {
        let item: HashMap<String, AttributeValue> = to_item(record)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str, start: Option<String>) -> Result<ScanPage> {
        let start_key: Option<HashMap<String, AttributeValue>> = match start {
            Some(query_id) => Some(to_item(RecordKey { query_id })?),
            None => None,
        };

        let result = self.client
            .scan()
            .table_name(&self.table_name)
            .filter_expression(PREFIX_FILTER)
            .expression_attribute_values(":date_prefix", AttributeValue::S(prefix.to_string()))
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        let items: Vec<LogRecord> = match result.items {
            Some(items) => from_items(items)?,
            None => Vec::new(),
        };

        let next = match result.last_evaluated_key {
            Some(key) => Some(from_item::<_, RecordKey>(key)?.query_id),
            None => None,
        };

        Ok(ScanPage { items, next })
    }
}

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into() }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        Ok(())
    }
}
