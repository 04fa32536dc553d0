use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::{date_prefix, export_key, previous_day, LogRecord};
use crate::store::{LogTable, ObjectStore};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub date: NaiveDate,
    /// Object written, if any records matched.
    pub key: Option<String>,
    pub processed: usize,
    pub pages: usize,
}

impl ExportSummary {
    pub fn message(&self) -> String {
        format!("Processed {} log entries", self.processed)
    }
}

pub struct LogExporter<T, S> {
    table: T,
    store: S,
}

impl<T: LogTable, S: ObjectStore> LogExporter<T, S> {
    pub fn new(table: T, store: S) -> Self {
        Self { table, store }
    }

    pub async fn export_previous_day(&self, now: DateTime<Utc>) -> Result<ExportSummary> {
        self.export_day(previous_day(now)).await
    }

    /// Collects every record of `day` and writes them as one JSON array.
    /// Nothing is written when the day has no records.
    pub async fn export_day(&self, day: NaiveDate) -> Result<ExportSummary> {
        let prefix = date_prefix(day);
        let (logs, pages) = self.collect(&prefix).await?;

        let key = if logs.is_empty() {
            None
        } else {
            let key = export_key(day);
            let body = serde_json::to_vec(&logs)?;
            self.store.put_object(&key, body, "application/json").await?;
            Some(key)
        };

        let summary = ExportSummary { date: day, key, processed: logs.len(), pages };
        info!(date = %day, processed = summary.processed, pages, "exported logs");

        Ok(summary)
    }

    async fn collect(&self, prefix: &str) -> Result<(Vec<LogRecord>, usize)> {
        let mut logs = Vec::new();
        let mut start = None;
        let mut pages = 0;

        loop {
            let page = self.table.scan_prefix(prefix, start).await?;
            pages += 1;
            debug!(page = pages, items = page.items.len(), "scanned page");
            logs.extend(page.items);

            match page.next {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        Ok((logs, pages))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::record::query_id;
    use crate::store::{MemoryLogTable, MemoryObjectStore};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 0, 5, 0).unwrap()
    }

    async fn seed(table: &MemoryLogTable, day: (i32, u32, u32), count: u32) {
        for i in 0..count {
            let at = Utc.with_ymd_and_hms(day.0, day.1, day.2, 8, i, 0).unwrap();
            let record = LogRecord {
                query_id: query_id(at),
                query: format!("query {i}"),
                response: "{}".to_string(),
            };
            table.put_record(&record).await.unwrap();
        }
    }

    fn exporter(
        table: &Arc<MemoryLogTable>,
        store: &Arc<MemoryObjectStore>,
    ) -> LogExporter<Arc<MemoryLogTable>, Arc<MemoryObjectStore>> {
        LogExporter::new(table.clone(), store.clone())
    }

    #[tokio::test]
    async fn exports_only_yesterdays_records() {
        let table = Arc::new(MemoryLogTable::new());
        let store = Arc::new(MemoryObjectStore::new());
        seed(&table, (2024, 5, 1), 4).await;
        seed(&table, (2024, 4, 30), 2).await;
        seed(&table, (2024, 5, 2), 3).await;

        let summary = exporter(&table, &store).export_previous_day(now()).await.unwrap();

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.key.as_deref(), Some("logs/2024-05-01.json"));
        assert_eq!(summary.message(), "Processed 4 log entries");

        let object = store.get("logs/2024-05-01.json").await.unwrap();
        assert_eq!(object.content_type, "application/json");
        let exported: Vec<LogRecord> = serde_json::from_slice(&object.body).unwrap();
        assert_eq!(exported.len(), 4);
        assert!(exported.iter().all(|r| r.query_id.starts_with("2024-05-01")));
    }

    #[tokio::test]
    async fn no_matches_skips_write() {
        let table = Arc::new(MemoryLogTable::new());
        let store = Arc::new(MemoryObjectStore::new());
        seed(&table, (2024, 4, 1), 3).await;

        let summary = exporter(&table, &store).export_previous_day(now()).await.unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.key, None);
        assert_eq!(summary.message(), "Processed 0 log entries");
        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn follows_every_page_before_writing() {
        let table = Arc::new(MemoryLogTable::with_page_size(3));
        let store = Arc::new(MemoryObjectStore::new());
        seed(&table, (2024, 4, 30), 2).await;
        seed(&table, (2024, 5, 1), 7).await;
        seed(&table, (2024, 5, 2), 1).await;

        let summary = exporter(&table, &store).export_previous_day(now()).await.unwrap();

        // 10 records, 3 examined per page
        assert_eq!(table.scan_calls(), 4);
        assert_eq!(summary.pages, 4);
        assert_eq!(summary.processed, 7);

        let object = store.get("logs/2024-05-01.json").await.unwrap();
        let exported: Vec<LogRecord> = serde_json::from_slice(&object.body).unwrap();
        let queries: Vec<&str> = exported.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, ["query 0", "query 1", "query 2", "query 3", "query 4", "query 5", "query 6"]);
    }

    #[tokio::test]
    async fn rerun_overwrites_same_day() {
        let table = Arc::new(MemoryLogTable::new());
        let store = Arc::new(MemoryObjectStore::new());
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        seed(&table, (2024, 5, 1), 1).await;
        exporter(&table, &store).export_day(day).await.unwrap();

        seed(&table, (2024, 5, 1), 3).await;
        let summary = exporter(&table, &store).export_day(day).await.unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(store.keys().await, vec!["logs/2024-05-01.json".to_string()]);
        let object = store.get("logs/2024-05-01.json").await.unwrap();
        let exported: Vec<LogRecord> = serde_json::from_slice(&object.body).unwrap();
        assert_eq!(exported.len(), 3);
    }
}
