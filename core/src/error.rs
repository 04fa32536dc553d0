#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("upstream request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error("upstream response is missing `{0}`")]
    MissingField(&'static str),
    #[error("dynamodb error: {0}")]
    Dynamo(#[from] aws_sdk_dynamodb::Error),
    #[error("dynamodb item error: {0}")]
    DynamoItem(#[from] serde_dynamo::Error),
    #[error("s3 error: {0}")]
    S3(#[from] aws_sdk_s3::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
