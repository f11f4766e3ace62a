#![deny(missing_docs)]
//! Metrics recorded while decoding event data

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use witchcraft_metrics::MetricRegistry;
// re-export exposed metric types
pub use witchcraft_metrics::{Counter, MetricId, Timer};

/// Number of entries handed to readers.
pub const ENTRIES_DECODED: &str = "besio.decode.entries";
/// Number of entry bytes handed to readers.
pub const BYTES_DECODED: &str = "besio.decode.bytes";
/// Wall time of complete decode passes.
pub const DECODE_PASS: &str = "besio.decode.pass";

/// A cheaply cloneable registry for decode metrics.
///
/// Clones share one registry, so concurrent passes over separate chunks add to the same totals.
#[derive(Default, Clone)]
pub struct BesMetrics {
    registry: Arc<MetricRegistry>,
}

impl BesMetrics {
    /// Returns the counter with the specified ID, creating a default instance if absent.
    ///
    /// # Panics
    ///
    /// Panics if a metric is registered with the ID that is not a counter.
    pub fn counter<T>(&self, id: T) -> Arc<Counter>
    where
        T: Into<MetricId>,
    {
        self.registry.counter(id)
    }

    /// Returns the timer with the specified ID, creating a default instance if absent.
    ///
    /// # Panics
    ///
    /// Panics if a metric is registered with the ID that is not a timer.
    pub fn timer<T>(&self, id: T) -> Arc<Timer>
    where
        T: Into<MetricId>,
    {
        self.registry.timer(id)
    }

    /// Returns the decode totals recorded so far.
    pub fn decode_summary(&self) -> DecodeSummary {
        DecodeSummary {
            entries: self.counter(ENTRIES_DECODED).count(),
            bytes: self.counter(BYTES_DECODED).count(),
            passes: self.timer(DECODE_PASS).count(),
        }
    }
}

/// Totals of the decode metrics of one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeSummary {
    /// Entries handed to readers.
    pub entries: i64,
    /// Entry bytes handed to readers.
    pub bytes: i64,
    /// Completed or aborted passes.
    pub passes: i64,
}

impl Display for DecodeSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} entries, {} bytes in {} passes",
            self.entries, self.bytes, self.passes
        )
    }
}
