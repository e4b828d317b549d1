use serde_json::Value;

use crate::error::Result;
use crate::model::{LoadOptions, LoadResult};

/// Data source operations a grid drives.
#[async_trait::async_trait]
pub trait DataStore: Send + Sync {
    /// Field that identifies a record.
    fn key(&self) -> &str;

    /// One page of records plus the total number matching the filter.
    async fn load(&self, options: &LoadOptions) -> Result<LoadResult>;

    /// Records whose key field equals `key`; one is expected but not enforced.
    async fn by_key(&self, key: &Value) -> Result<LoadResult>;

    async fn insert(&self, values: &Value) -> Result<Value>;

    async fn remove(&self, key: &Value) -> Result<Value>;

    /// Apply a partial update to the record identified by `key`.
    async fn update(&self, key: &Value, values: &Value) -> Result<Value>;

    /// Number of records matching `options`, ignoring its paging.
    async fn total_count(&self, options: &LoadOptions) -> Result<u64>;
}
