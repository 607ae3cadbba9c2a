use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{
    GatewayCallRecord, HostError, HostPlatform, InvoiceId, InvoicePayment, TransactionLog,
};

#[derive(Default)]
struct HostState {
    invoices: HashSet<InvoiceId>,
    transactions: HashSet<String>,
    gateway_calls: Vec<GatewayCallRecord>,
    transaction_logs: Vec<TransactionLog>,
    payments: Vec<InvoicePayment>,
    status_updates: Vec<(InvoiceId, String)>,
}

/// Host stand-in that keeps every interaction in memory.
///
/// Used for local runs without a billing platform and as the observable host
/// in tests.
#[derive(Default)]
pub struct InMemoryHost {
    accept_any_invoice: bool,
    state: Mutex<HostState>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every numeric invoice id is treated as existing.
    pub fn permissive() -> Self {
        Self { accept_any_invoice: true, ..Self::default() }
    }

    pub fn with_invoice(self, invoice_id: u64) -> Self {
        self.lock().invoices.insert(InvoiceId(invoice_id));
        self
    }

    pub fn with_transaction(self, transaction_id: &str) -> Self {
        self.lock().transactions.insert(transaction_id.to_string());
        self
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        // A poisoned lock only means a test panicked mid-record; the data is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn gateway_calls(&self) -> Vec<GatewayCallRecord> {
        self.lock().gateway_calls.clone()
    }

    pub fn transaction_logs(&self) -> Vec<TransactionLog> {
        self.lock().transaction_logs.clone()
    }

    pub fn payments(&self) -> Vec<InvoicePayment> {
        self.lock().payments.clone()
    }

    pub fn status_updates(&self) -> Vec<(InvoiceId, String)> {
        self.lock().status_updates.clone()
    }
}

#[async_trait]
impl HostPlatform for InMemoryHost {
    async fn validate_invoice_id(&self, raw: &str) -> Result<InvoiceId, HostError> {
        let invoice_id = InvoiceId::parse(raw)?;
        if self.accept_any_invoice || self.lock().invoices.contains(&invoice_id) {
            Ok(invoice_id)
        } else {
            Err(HostError::InvalidInvoice(raw.to_string()))
        }
    }

    async fn reject_duplicate_transaction(&self, transaction_id: &str) -> Result<(), HostError> {
        if self.lock().transactions.contains(transaction_id) {
            Err(HostError::DuplicateTransaction(transaction_id.to_string()))
        } else {
            Ok(())
        }
    }

    async fn record_gateway_call(&self, record: GatewayCallRecord) {
        debug!(action = %record.action, "gateway call recorded");
        self.lock().gateway_calls.push(record);
    }

    async fn log_transaction(&self, entry: TransactionLog) {
        debug!(status = %entry.status, "transaction logged");
        self.lock().transaction_logs.push(entry);
    }

    async fn apply_invoice_payment(&self, payment: InvoicePayment) -> Result<(), HostError> {
        let mut state = self.lock();
        state.transactions.insert(payment.transaction_id.clone());
        state.payments.push(payment);
        Ok(())
    }

    async fn set_invoice_status(&self, invoice_id: InvoiceId, status: &str) -> Result<(), HostError> {
        self.lock().status_updates.push((invoice_id, status.to_string()));
        Ok(())
    }
}
