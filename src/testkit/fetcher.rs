//! Mock [`SnapshotFetcher`] with scripted results.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::StatsSnapshot;
use crate::error::{Error, Result};
use crate::port::outbound::snapshot::SnapshotFetcher;

/// One scripted fetch result.
#[derive(Debug, Clone)]
pub enum FetchStep {
    Ok(StatsSnapshot),
    /// Fail with this HTTP status.
    Status(u16),
}

/// A fetcher that replays [`FetchStep`]s in order.
///
/// The last step repeats once the script is down to one entry.
pub struct ScriptedFetcher {
    steps: Mutex<VecDeque<FetchStep>>,
    delay: Duration,
    calls: Arc<AtomicU32>,
}

impl ScriptedFetcher {
    pub fn new(steps: Vec<FetchStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Always succeed with `snapshot`.
    pub fn ok(snapshot: StatsSnapshot) -> Self {
        Self::new(vec![FetchStep::Ok(snapshot)])
    }

    /// Always fail with `status`.
    pub fn failing(status: u16) -> Self {
        Self::new(vec![FetchStep::Status(status)])
    }

    /// Sleep before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared call counter, usable after the fetcher is moved into an `Arc`.
    pub fn calls(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }

    fn next_step(&self) -> FetchStep {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap_or(FetchStep::Status(500))
        } else {
            steps.front().cloned().unwrap_or(FetchStep::Status(500))
        }
    }
}

#[async_trait]
impl SnapshotFetcher for ScriptedFetcher {
    async fn fetch_snapshot(&self) -> Result<StatsSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.next_step();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match step {
            FetchStep::Ok(snapshot) => Ok(snapshot),
            FetchStep::Status(status) => Err(Error::HttpStatus { status }),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
