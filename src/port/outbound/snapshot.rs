//! Snapshot port for the REST statistics endpoint.

use async_trait::async_trait;

use crate::domain::StatsSnapshot;
use crate::error::Error;

/// Fetches a full dashboard snapshot over HTTP.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch the current snapshot.
    async fn fetch_snapshot(&self) -> Result<StatsSnapshot, Error>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}
