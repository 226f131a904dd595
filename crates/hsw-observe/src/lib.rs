//! hsw-observe: vendor-neutral observability ABI.
//!
//! The index crate depends only on these traits and event types. Backends
//! (Prometheus exporters, graph renderers, test recorders) live elsewhere.

pub trait Counter: Send + Sync {
    fn inc(&self, v: u64);
}
pub trait Gauge: Send + Sync {
    fn set(&self, v: i64);
}
pub trait Histogram: Send + Sync {
    fn observe(&self, v: f64);
}

/// Instrument factory plus a typed event sink.
///
/// Implementations must be cheap to call from the build loop; the index
/// requests instruments per observation rather than caching them.
pub trait Meter: Send + Sync + 'static {
    fn counter(&self, name: &'static str, labels: Labels) -> Box<dyn Counter>;
    fn gauge(&self, name: &'static str, labels: Labels) -> Box<dyn Gauge>;
    fn histo(&self, name: &'static str, buckets: &'static [f64], labels: Labels)
        -> Box<dyn Histogram>;
    fn emit(&self, evt: VizEvent);
}

/// Metric labels as static key/value pairs.
pub type Labels = &'static [(&'static str, &'static str)];

/// A do-nothing meter for tests and users who don't care about telemetry.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMeter;

/// Instrument returned by [`NoopMeter`]; discards every observation.
struct Noop;
impl Counter for Noop {
    fn inc(&self, _v: u64) {}
}
impl Gauge for Noop {
    fn set(&self, _v: i64) {}
}
impl Histogram for Noop {
    fn observe(&self, _v: f64) {}
}

impl Meter for NoopMeter {
    fn counter(&self, _name: &'static str, _labels: Labels) -> Box<dyn Counter> {
        Box::new(Noop)
    }
    fn gauge(&self, _name: &'static str, _labels: Labels) -> Box<dyn Gauge> {
        Box::new(Noop)
    }
    fn histo(
        &self,
        _name: &'static str,
        _buckets: &'static [f64],
        _labels: Labels,
    ) -> Box<dyn Histogram> {
        Box::new(Noop)
    }
    fn emit(&self, _evt: VizEvent) {}
}

/// Typed events for live visualization (vector contents never included).
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum VizEvent {
    Build(BuildEvt),
    Query(QueryEvt),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildEvt {
    pub kind: BuildKind,
}
#[derive(Clone, Debug, PartialEq)]
pub enum BuildKind {
    /// Construction started over `nodes` vectors.
    Start { nodes: u32, levels: u8, k: u32 },
    /// Final shape of one level.
    LevelComplete { level: u8, members: u32, edges: u64 },
    /// Construction finished and the index is frozen.
    Finish { ms: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryEvt {
    pub level: u8,
    pub kind: QueryKind,
}
#[derive(Clone, Debug, PartialEq)]
pub enum QueryKind {
    /// Entry node picked from the top level.
    Start { node: u32 },
    /// One greedy expansion around `current`.
    Step {
        current: u32,
        candidates: u32,
        moved_to: Option<u32>,
    },
    /// Traversal ended at `node` after `hops` moves.
    Finish { node: u32, hops: u32 },
}

/// Macros (simple versions). Can be feature-gated if desired.
#[macro_export]
macro_rules! obs_count {
    ($m:expr, $name:expr, $labels:expr, $v:expr) => {{
        $m.counter($name, $labels).inc($v as u64);
    }};
}
#[macro_export]
macro_rules! obs_gauge {
    ($m:expr, $name:expr, $labels:expr, $v:expr) => {{
        $m.gauge($name, $labels).set($v as i64);
    }};
}
#[macro_export]
macro_rules! obs_hist {
    ($m:expr, $name:expr, $labels:expr, $v:expr) => {{
        $m.histo($name, &[], $labels).observe($v as f64);
    }};
}
#[macro_export]
macro_rules! obs_timed {
    ($m:expr, $name:expr, $labels:expr, $body:block) => {{
        let __t = std::time::Instant::now();
        let __ret = { $body };
        let __ms = __t.elapsed().as_secs_f64() * 1000.0;
        $m.histo($name, &[], $labels).observe(__ms);
        __ret
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_meter_accepts_everything() {
        let m = NoopMeter;
        obs_count!(m, "hsw_test_total", &[("kind", "unit")], 3);
        obs_gauge!(m, "hsw_test_gauge", &[], -1);
        obs_hist!(m, "hsw_test_hist", &[], 0.5);
        let v = obs_timed!(m, "hsw_test_ms", &[], { 40 + 2 });
        assert_eq!(v, 42);
        m.emit(VizEvent::Build(BuildEvt {
            kind: BuildKind::Finish { ms: 1 },
        }));
    }
}
