//! Shared pieces of the chatbot query logger: the query handler, the daily
//! log exporter and the clients they run against.

pub mod aws;
pub mod config;
pub mod error;
pub mod export;
pub mod intent;
pub mod query;
pub mod record;
pub mod store;
pub mod upstream;

pub use config::{ExportConfig, QueryConfig};
pub use error::{ConfigError, Error, Result};
pub use export::{ExportSummary, LogExporter};
pub use query::{QueryHandler, QueryRequest, QueryResponse};
pub use record::LogRecord;
