use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::record::LogRecord;

/// One page of a filtered table scan. `next` is the `QueryId` to resume
/// after, or `None` once the table is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub items: Vec<LogRecord>,
    pub next: Option<String>,
}

#[async_trait]
pub trait LogTable: Send + Sync {
    async fn put_record(&self, record: &LogRecord) -> Result<()>;

    /// Scans one page starting after `start`, keeping only records whose
    /// `QueryId` begins with `prefix`.
    async fn scan_prefix(&self, prefix: &str, start: Option<String>) -> Result<ScanPage>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

#[async_trait]
impl<T: LogTable + ?Sized> LogTable for Arc<T> {
    async fn put_record(&self, record: &LogRecord) -> Result<()> {
        (**self).put_record(record).await
    }

    async fn scan_prefix(&self, prefix: &str, start: Option<String>) -> Result<ScanPage> {
        (**self).scan_prefix(prefix, start).await
    }
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        (**self).put_object(key, body, content_type).await
    }
}

/// In-process table keyed by `QueryId`.
///
/// Like a DynamoDB scan, the page size bounds the number of records
/// *examined*, so a page can come back empty while more remain.
#[derive(Debug)]
pub struct MemoryLogTable {
    records: Mutex<BTreeMap<String, LogRecord>>,
    page_size: usize,
    scan_calls: AtomicUsize,
}

impl MemoryLogTable {
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
            scan_calls: AtomicUsize::new(0),
        }
    }

    pub async fn records(&self) -> Vec<LogRecord> {
        self.records.lock().await.values().cloned().collect()
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }
}

impl Default for MemoryLogTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogTable for MemoryLogTable {
    async fn put_record(&self, record: &LogRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        records.insert(record.query_id.clone(), record.clone());
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str, start: Option<String>) -> Result<ScanPage> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);

        let records = self.records.lock().await;
        let lower = match &start {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };

        let mut examined = records.range((lower, Bound::Unbounded));
        let page: Vec<&LogRecord> = examined.by_ref().take(self.page_size).map(|(_, r)| r).collect();
        let more = examined.next().is_some();

        let next = match page.last() {
            Some(last) if more => Some(last.query_id.clone()),
            _ => None,
        };

        let items = page
            .into_iter()
            .filter(|r| r.query_id.starts_with(prefix))
            .cloned()
            .collect();

        Ok(ScanPage { items, next })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let object = StoredObject { body, content_type: content_type.to_string() };
        self.objects.lock().await.insert(key.to_string(), object);
        Ok(())
    }
}
