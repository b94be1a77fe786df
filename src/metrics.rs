use prometheus::{Counter, Encoder, Opts, Registry, TextEncoder};

// ── Prometheus Metrics ────────────────────────────────────────

pub struct PaymentMetrics {
    registry: Registry,
    pub payments_total:          Counter,
    pub payments_declined_total: Counter,
}

impl PaymentMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let payments_total = Counter::with_opts(Opts::new(
            "payment_service_payments_total",
            "Total payments processed",
        ))
        .unwrap();
        let payments_declined_total = Counter::with_opts(Opts::new(
            "payment_service_payments_declined_total",
            "Payments declined by the card check",
        ))
        .unwrap();

        registry.register(Box::new(payments_total.clone())).unwrap();
        registry
            .register(Box::new(payments_declined_total.clone()))
            .unwrap();

        PaymentMetrics {
            registry,
            payments_total,
            payments_declined_total,
        }
    }

    /// Encode the registry in Prometheus text exposition format.
    pub fn render(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer).unwrap();
        buffer
    }
}

impl Default for PaymentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_rendered_output() {
        let metrics = PaymentMetrics::new();
        metrics.payments_total.inc();
        metrics.payments_declined_total.inc();

        let rendered = String::from_utf8(metrics.render()).expect("exposition should be utf-8");
        assert!(rendered.contains("payment_service_payments_total 1"));
        assert!(rendered.contains("payment_service_payments_declined_total 1"));
    }
}
