// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Hand-rolled Prometheus text exposition. Plain atomics, not a metrics
//! framework — the teacher's `MetricsHealth` preference for dependency-light
//! counters over a heavyweight crate, extended here with a small histogram
//! bucket set for request latency.

use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed latency buckets in milliseconds, `+Inf` implicit as the last bucket.
const LATENCY_BUCKETS_MS: &[u64] = &[5, 10, 25, 50, 100, 250, 500, 1000, 2500, 5000];

struct Histogram {
    buckets: Vec<AtomicU64>,
    sum_ms: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    fn new() -> Self {
        Self {
            buckets: LATENCY_BUCKETS_MS.iter().map(|_| AtomicU64::new(0)).collect(),
            sum_ms: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    fn observe(&self, value_ms: u64) {
        for (bucket, &le) in self.buckets.iter().zip(LATENCY_BUCKETS_MS) {
            if value_ms <= le {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.sum_ms.fetch_add(value_ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn render(&self, out: &mut String, name: &str) {
        let mut cumulative = 0u64;
        for (bucket, &le) in self.buckets.iter().zip(LATENCY_BUCKETS_MS) {
            cumulative = cumulative.max(bucket.load(Ordering::Relaxed));
            out.push_str(&format!("{name}_bucket{{le=\"{le}\"}} {cumulative}\n"));
        }
        let total = self.count.load(Ordering::Relaxed);
        out.push_str(&format!("{name}_bucket{{le=\"+Inf\"}} {total}\n"));
        out.push_str(&format!("{name}_sum {}\n", self.sum_ms.load(Ordering::Relaxed)));
        out.push_str(&format!("{name}_count {total}\n"));
    }
}

/// Process-wide counters and the one request-latency histogram, rendered as
/// Prometheus text exposition by `routes::metrics_route`.
pub struct Metrics {
    http_requests_total: AtomicU64,
    webhooks_accepted_total: AtomicU64,
    webhooks_duplicate_total: AtomicU64,
    webhooks_rejected_total: AtomicU64,
    eventbus_publish_failures_total: AtomicU64,
    jobs_completed_total: AtomicU64,
    jobs_failed_total: AtomicU64,
    approvals_proposed_total: AtomicU64,
    rate_limited_total: AtomicU64,
    request_latency: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            webhooks_accepted_total: AtomicU64::new(0),
            webhooks_duplicate_total: AtomicU64::new(0),
            webhooks_rejected_total: AtomicU64::new(0),
            eventbus_publish_failures_total: AtomicU64::new(0),
            jobs_completed_total: AtomicU64::new(0),
            jobs_failed_total: AtomicU64::new(0),
            approvals_proposed_total: AtomicU64::new(0),
            rate_limited_total: AtomicU64::new(0),
            request_latency: Histogram::new(),
        }
    }

    pub fn record_request(&self, latency_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.request_latency.observe(latency_ms);
    }

    pub fn record_webhook_accepted(&self) {
        self.webhooks_accepted_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_webhook_duplicate(&self) {
        self.webhooks_duplicate_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_webhook_rejected(&self) {
        self.webhooks_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eventbus_publish_failure(&self) {
        self.eventbus_publish_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_completed(&self) {
        self.jobs_completed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_failed(&self) {
        self.jobs_failed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_approval_proposed(&self) {
        self.approvals_proposed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Renders every counter and the latency histogram as Prometheus text
    /// exposition format (`# HELP` / `# TYPE` comments included).
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# HELP gateway_http_requests_total Total HTTP requests served.\n");
        out.push_str("# TYPE gateway_http_requests_total counter\n");
        out.push_str(&format!(
            "gateway_http_requests_total {}\n",
            self.http_requests_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_webhooks_accepted_total Webhook deliveries persisted.\n");
        out.push_str("# TYPE gateway_webhooks_accepted_total counter\n");
        out.push_str(&format!(
            "gateway_webhooks_accepted_total {}\n",
            self.webhooks_accepted_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_webhooks_duplicate_total Webhook deliveries short-circuited as duplicates.\n");
        out.push_str("# TYPE gateway_webhooks_duplicate_total counter\n");
        out.push_str(&format!(
            "gateway_webhooks_duplicate_total {}\n",
            self.webhooks_duplicate_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_webhooks_rejected_total Webhook deliveries rejected (signature, disabled integration, size).\n");
        out.push_str("# TYPE gateway_webhooks_rejected_total counter\n");
        out.push_str(&format!(
            "gateway_webhooks_rejected_total {}\n",
            self.webhooks_rejected_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_eventbus_publish_failures_total Best-effort broker publishes that failed.\n");
        out.push_str("# TYPE gateway_eventbus_publish_failures_total counter\n");
        out.push_str(&format!(
            "gateway_eventbus_publish_failures_total {}\n",
            self.eventbus_publish_failures_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_jobs_completed_total Workflow jobs completed successfully.\n");
        out.push_str("# TYPE gateway_jobs_completed_total counter\n");
        out.push_str(&format!(
            "gateway_jobs_completed_total {}\n",
            self.jobs_completed_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_jobs_failed_total Workflow jobs exhausted their retries.\n");
        out.push_str("# TYPE gateway_jobs_failed_total counter\n");
        out.push_str(&format!(
            "gateway_jobs_failed_total {}\n",
            self.jobs_failed_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_approvals_proposed_total Approvals created.\n");
        out.push_str("# TYPE gateway_approvals_proposed_total counter\n");
        out.push_str(&format!(
            "gateway_approvals_proposed_total {}\n",
            self.approvals_proposed_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_rate_limited_total Requests rejected by the per-IP rate limiter.\n");
        out.push_str("# TYPE gateway_rate_limited_total counter\n");
        out.push_str(&format!(
            "gateway_rate_limited_total {}\n",
            self.rate_limited_total.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP gateway_http_request_duration_ms HTTP request latency in milliseconds.\n");
        out.push_str("# TYPE gateway_http_request_duration_ms histogram\n");
        self.request_latency.render(&mut out, "gateway_http_request_duration_ms");

        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_counters_at_zero() {
        let metrics = Metrics::new();
        let rendered = metrics.render();
        assert!(rendered.contains("gateway_http_requests_total 0"));
        assert!(rendered.contains("gateway_http_request_duration_ms_count 0"));
    }

    #[test]
    fn counters_increment() {
        let metrics = Metrics::new();
        metrics.record_webhook_accepted();
        metrics.record_webhook_accepted();
        metrics.record_webhook_duplicate();
        let rendered = metrics.render();
        assert!(rendered.contains("gateway_webhooks_accepted_total 2"));
        assert!(rendered.contains("gateway_webhooks_duplicate_total 1"));
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let metrics = Metrics::new();
        metrics.record_request(7);
        metrics.record_request(300);
        let rendered = metrics.render();
        assert!(rendered.contains("gateway_http_request_duration_ms_bucket{le=\"10\"} 1"));
        assert!(rendered.contains("gateway_http_request_duration_ms_bucket{le=\"500\"} 2"));
        assert!(rendered.contains("gateway_http_request_duration_ms_count 2"));
    }
}
