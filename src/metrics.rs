use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// In-process request counters and latency histogram (microseconds).
pub struct Metrics {
    latency: Mutex<Histogram<u64>>,
    counters: Mutex<Counters>,
    started: Instant,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    total: u64,
    failed: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            // 3 significant figures, auto-resizing
            latency: Mutex::new(Histogram::new(3).expect("valid histogram precision")),
            counters: Mutex::new(Counters::default()),
            started: Instant::now(),
        }
    }

    pub fn observe_request(&self, dur: Duration, success: bool) {
        let micros = u64::try_from(dur.as_micros()).unwrap_or(u64::MAX);
        let _ = self.latency.lock().record(micros);

        let mut counters = self.counters.lock();
        counters.total += 1;
        if !success {
            counters.failed += 1;
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.counters.lock().total
    }

    pub fn failed_requests(&self) -> u64 {
        self.counters.lock().failed
    }

    pub fn format(&self) -> String {
        let (p50, p95, p99) = {
            let h = self.latency.lock();
            (
                h.value_at_quantile(0.50) as f64 / 1000.0,
                h.value_at_quantile(0.95) as f64 / 1000.0,
                h.value_at_quantile(0.99) as f64 / 1000.0,
            )
        };

        let counters = *self.counters.lock();
        let elapsed = self.started.elapsed().as_secs_f64().max(1.0);
        let qps = counters.total as f64 / elapsed;

        format!(
            "requests_total {}\nrequests_failed {}\nqps {:.2}\np50_ms {:.3}\np95_ms {:.3}\np99_ms {:.3}\n",
            counters.total, counters.failed, qps, p50, p95, p99
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
