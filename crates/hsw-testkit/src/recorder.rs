//! In-memory meter that records everything it is given.

use hsw_observe::{Counter, Gauge, Histogram, Labels, Meter, VizEvent};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct Recorded {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, i64>,
    histograms: BTreeMap<&'static str, Vec<f64>>,
    events: Vec<VizEvent>,
}

/// Meter that keeps counters, gauges, histogram samples and events in memory.
///
/// Clones share the same storage, so a test can hand one clone to the index
/// and inspect another.
#[derive(Clone, Default)]
pub struct RecordingMeter {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter (0 if never incremented).
    pub fn counter_value(&self, name: &str) -> u64 {
        self.inner.lock().counters.get(name).copied().unwrap_or(0)
    }

    /// Last value set on a gauge.
    pub fn gauge_value(&self, name: &str) -> Option<i64> {
        self.inner.lock().gauges.get(name).copied()
    }

    /// All samples observed on a histogram.
    pub fn samples(&self, name: &str) -> Vec<f64> {
        self.inner
            .lock()
            .histograms
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Every emitted event, in emission order.
    pub fn events(&self) -> Vec<VizEvent> {
        self.inner.lock().events.clone()
    }
}

struct RecCounter {
    name: &'static str,
    inner: Arc<Mutex<Recorded>>,
}
impl Counter for RecCounter {
    fn inc(&self, v: u64) {
        *self.inner.lock().counters.entry(self.name).or_insert(0) += v;
    }
}

struct RecGauge {
    name: &'static str,
    inner: Arc<Mutex<Recorded>>,
}
impl Gauge for RecGauge {
    fn set(&self, v: i64) {
        self.inner.lock().gauges.insert(self.name, v);
    }
}

struct RecHisto {
    name: &'static str,
    inner: Arc<Mutex<Recorded>>,
}
impl Histogram for RecHisto {
    fn observe(&self, v: f64) {
        self.inner
            .lock()
            .histograms
            .entry(self.name)
            .or_default()
            .push(v);
    }
}

impl Meter for RecordingMeter {
    fn counter(&self, name: &'static str, _labels: Labels) -> Box<dyn Counter> {
        Box::new(RecCounter {
            name,
            inner: Arc::clone(&self.inner),
        })
    }
    fn gauge(&self, name: &'static str, _labels: Labels) -> Box<dyn Gauge> {
        Box::new(RecGauge {
            name,
            inner: Arc::clone(&self.inner),
        })
    }
    fn histo(
        &self,
        name: &'static str,
        _buckets: &'static [f64],
        _labels: Labels,
    ) -> Box<dyn Histogram> {
        Box::new(RecHisto {
            name,
            inner: Arc::clone(&self.inner),
        })
    }
    fn emit(&self, evt: VizEvent) {
        self.inner.lock().events.push(evt);
    }
}
