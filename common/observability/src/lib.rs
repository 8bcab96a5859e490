use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_GATEWAY_ERROR: &str = "gateway_error";
pub const OUTCOME_TRANSPORT_ERROR: &str = "transport_error";
pub const OUTCOME_MALFORMED_RESPONSE: &str = "malformed_response";
pub const OUTCOME_SIGNING_ERROR: &str = "signing_error";

/// Counters and latency histograms for calls made to the payment initiation API.
#[derive(Clone)]
pub struct GatewayMetrics {
    pub registry: Registry,
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let requests_total = IntCounterVec::new(
            Opts::new(
                "pi_gateway_requests_total",
                "Payment initiation API calls by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .expect("static counter definition");
        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pi_gateway_request_duration_seconds",
                "Wall time of payment initiation API calls including signing",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["operation"],
        )
        .expect("static histogram definition");
        let _ = registry.register(Box::new(requests_total.clone()));
        let _ = registry.register(Box::new(request_duration_seconds.clone()));
        GatewayMetrics {
            registry,
            requests_total,
            request_duration_seconds,
        }
    }

    pub fn observe(&self, operation: &str, outcome: &str, elapsed_seconds: f64) {
        self.requests_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[operation])
            .observe(elapsed_seconds);
    }

    pub fn request_count(&self, operation: &str, outcome: &str) -> u64 {
        self.requests_total
            .with_label_values(&[operation, outcome])
            .get()
    }

    /// Prometheus text exposition of everything in the registry.
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_counts_per_operation_and_outcome() {
        let metrics = GatewayMetrics::new();
        metrics.observe("get_payment_providers", OUTCOME_SUCCESS, 0.2);
        metrics.observe("get_payment_providers", OUTCOME_SUCCESS, 0.3);
        metrics.observe("get_payment_providers", OUTCOME_GATEWAY_ERROR, 0.1);

        assert_eq!(metrics.request_count("get_payment_providers", OUTCOME_SUCCESS), 2);
        assert_eq!(metrics.request_count("get_payment_providers", OUTCOME_GATEWAY_ERROR), 1);
        assert_eq!(metrics.request_count("get_payment_status", OUTCOME_SUCCESS), 0);

        let families = metrics.registry.gather();
        assert!(families
            .iter()
            .any(|family| family.get_name() == "pi_gateway_request_duration_seconds"));
    }

    #[test]
    fn render_exposes_counters_in_text_format() {
        let metrics = GatewayMetrics::new();
        metrics.observe("create_payment_initiation", OUTCOME_TRANSPORT_ERROR, 1.5);

        let text = metrics.render().expect("render");
        assert!(text.contains("# TYPE pi_gateway_requests_total counter"));
        assert!(text.contains(
            r#"pi_gateway_requests_total{operation="create_payment_initiation",outcome="transport_error"} 1"#
        ));
        assert!(text.contains("pi_gateway_request_duration_seconds_count"));
    }
}
