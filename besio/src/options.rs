use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use besio_error::{BesResult, besio_bail};
use besio_metrics::BesMetrics;

/// Entries decoded between two checks of the cancellation flag.
pub const DEFAULT_CHECK_INTERVAL: u64 = 2000;

/// Options for an [`crate::EventReader`].
#[derive(Clone)]
pub struct EventReaderOptions {
    /// Entries decoded between two checks of the cancellation flag.
    check_interval: u64,
    /// When set, the running pass stops at the next check.
    cancel: Option<Arc<AtomicBool>>,
    metrics: BesMetrics,
}

impl Default for EventReaderOptions {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            cancel: None,
            metrics: BesMetrics::default(),
        }
    }
}

impl EventReaderOptions {
    /// Configure how many entries are decoded between cancellation checks.
    pub fn with_check_interval(mut self, check_interval: u64) -> BesResult<Self> {
        if check_interval == 0 {
            besio_bail!("check interval must be at least 1");
        }
        self.check_interval = check_interval;
        Ok(self)
    }

    /// Configure a flag that cancels a running pass when set.
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Configure the registry decode metrics are recorded in.
    pub fn with_metrics(mut self, metrics: BesMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the number of entries decoded between cancellation checks.
    pub fn check_interval(&self) -> u64 {
        self.check_interval
    }

    /// Returns the metrics registry.
    pub fn metrics(&self) -> &BesMetrics {
        &self.metrics
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|cancel| cancel.load(Ordering::Relaxed))
    }
}
