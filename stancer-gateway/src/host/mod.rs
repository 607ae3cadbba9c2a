//! Port to the host billing platform. The gateway owns no persistence; invoice
//! checks, payment application and both logs go through [`HostPlatform`].

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod http;
pub mod memory;

pub use http::HttpHost;
pub use memory::InMemoryHost;

pub const GATEWAY_NAME: &str = "stancer";
pub const PAYMENT_PENDING: &str = "Payment Pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub u64);

impl InvoiceId {
    pub fn parse(raw: &str) -> Result<Self, HostError> {
        raw.trim()
            .parse::<u64>()
            .map(InvoiceId)
            .map_err(|_| HostError::InvalidInvoice(raw.to_string()))
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid invoice id: {0}")]
    InvalidInvoice(String),
    #[error("duplicate transaction id: {0}")]
    DuplicateTransaction(String),
    #[error("host platform error: {0}")]
    Backend(String),
}

/// One provider exchange as written to the host gateway log.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayCallRecord {
    pub gateway: &'static str,
    pub action: String,
    pub request: String,
    pub response: String,
    pub parsed: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionLog {
    pub gateway: &'static str,
    pub data: serde_json::Value,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePayment {
    pub invoice_id: InvoiceId,
    pub transaction_id: String,
    pub amount: BigDecimal,
    pub fee: BigDecimal,
    pub gateway: &'static str,
}

#[async_trait]
pub trait HostPlatform: Send + Sync {
    /// Normalise `raw` to an invoice id; an invoice in any status is valid.
    async fn validate_invoice_id(&self, raw: &str) -> Result<InvoiceId, HostError>;
    async fn reject_duplicate_transaction(&self, transaction_id: &str) -> Result<(), HostError>;
    /// Logging never fails the request.
    async fn record_gateway_call(&self, record: GatewayCallRecord);
    async fn log_transaction(&self, entry: TransactionLog);
    async fn apply_invoice_payment(&self, payment: InvoicePayment) -> Result<(), HostError>;
    async fn set_invoice_status(&self, invoice_id: InvoiceId, status: &str) -> Result<(), HostError>;
}
