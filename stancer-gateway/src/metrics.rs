use anyhow::Result;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    provider_calls: IntCounterVec,
    callback_outcomes: IntCounterVec,
    refunds: IntCounterVec,
}

impl GatewayMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let provider_calls = IntCounterVec::new(
            Opts::new("stancer_provider_calls_total", "Provider API calls by endpoint and outcome"),
            &["endpoint", "outcome"],
        )?;
        let callback_outcomes = IntCounterVec::new(
            Opts::new(
                "stancer_callback_outcomes_total",
                "Verified checkout returns grouped by local transaction status",
            ),
            &["status"],
        )?;
        let refunds = IntCounterVec::new(
            Opts::new("stancer_refunds_total", "Refund attempts grouped by result"),
            &["result"],
        )?;
        registry.register(Box::new(provider_calls.clone()))?;
        registry.register(Box::new(callback_outcomes.clone()))?;
        registry.register(Box::new(refunds.clone()))?;
        Ok(Self {
            registry,
            provider_calls,
            callback_outcomes,
            refunds,
        })
    }

    pub fn record_provider_call(&self, endpoint: &str, outcome: &str) {
        self.provider_calls.with_label_values(&[endpoint, outcome]).inc();
    }

    pub fn record_callback(&self, status: &str) {
        self.callback_outcomes.with_label_values(&[status]).inc();
    }

    pub fn record_refund(&self, result: &str) {
        self.refunds.with_label_values(&[result]).inc();
    }

    /// Prometheus text exposition of every registered counter.
    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        let content_type = [(header::CONTENT_TYPE, encoder.format_type().to_string())];
        Ok((content_type, buffer).into_response())
    }
}
