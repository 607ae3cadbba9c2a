pub mod app_state;
pub mod callback;
pub mod checkout;
pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod integrity;
pub mod link;
pub mod metadata;
pub mod metrics;
pub mod provider;
pub mod refund;
pub mod status;

// Re-export key types for tests and embedding hosts
pub use crate::app_state::AppState;
pub use crate::config::{GatewayConfig, KeyPair, Mode};
pub use crate::error::GatewayError;
pub use crate::handlers::router;
pub use crate::host::{HostPlatform, HttpHost, InMemoryHost, InvoiceId};
pub use crate::metrics::GatewayMetrics;
pub use crate::provider::StancerClient;
pub use crate::status::TransactionStatus;
