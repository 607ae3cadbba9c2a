use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::host::HostPlatform;
use crate::metrics::GatewayMetrics;
use crate::provider::{ProviderCall, StancerClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub provider: StancerClient,
    pub host: Arc<dyn HostPlatform>,
    pub metrics: Arc<GatewayMetrics>,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        provider: StancerClient,
        host: Arc<dyn HostPlatform>,
        metrics: GatewayMetrics,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            host,
            metrics: Arc::new(metrics),
        }
    }

    /// Write the exchange to the host gateway log and count it.
    pub async fn record_call(&self, call: &ProviderCall) {
        self.metrics
            .record_provider_call(call.endpoint, call.outcome_label());
        self.host.record_gateway_call(call.record()).await;
    }
}
