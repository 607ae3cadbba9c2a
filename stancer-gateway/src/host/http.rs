//! Host bridge over HTTP. The billing platform exposes a small local API and
//! this adapter forwards each port call to it.
//!
//! - `GET  /invoices/{id}`            200 exists, 404 unknown
//! - `GET  /transactions?id=…`        200 already recorded, 404 new
//! - `POST /gateway-log`              gateway call record
//! - `POST /transaction-log`          transaction outcome
//! - `POST /invoices/{id}/payments`   apply a payment
//! - `PUT  /invoices/{id}/status`     `{ "status": … }`

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::{
    GatewayCallRecord, HostError, HostPlatform, InvoiceId, InvoicePayment, TransactionLog,
};

#[derive(Clone)]
pub struct HttpHost {
    client: Client,
    base_url: String,
}

impl HttpHost {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_log<T: Serialize + Sync>(&self, path: &str, body: &T) {
        match self.client.post(self.url(path)).json(body).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => warn!(status = %resp.status(), path, "host rejected log entry"),
            Err(err) => warn!(error = %err, path, "failed to deliver log entry to host"),
        }
    }
}

fn backend(err: reqwest::Error) -> HostError {
    HostError::Backend(err.to_string())
}

#[async_trait]
impl HostPlatform for HttpHost {
    async fn validate_invoice_id(&self, raw: &str) -> Result<InvoiceId, HostError> {
        let invoice_id = InvoiceId::parse(raw)?;
        let resp = self
            .client
            .get(self.url(&format!("/invoices/{invoice_id}")))
            .send()
            .await
            .map_err(backend)?;
        match resp.status() {
            StatusCode::OK => Ok(invoice_id),
            StatusCode::NOT_FOUND => Err(HostError::InvalidInvoice(raw.to_string())),
            s => Err(HostError::Backend(format!("unexpected status {s} while fetching invoice"))),
        }
    }

    async fn reject_duplicate_transaction(&self, transaction_id: &str) -> Result<(), HostError> {
        let resp = self
            .client
            .get(self.url("/transactions"))
            .query(&[("id", transaction_id)])
            .send()
            .await
            .map_err(backend)?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(()),
            StatusCode::OK => Err(HostError::DuplicateTransaction(transaction_id.to_string())),
            s => Err(HostError::Backend(format!("unexpected status {s} while checking transaction"))),
        }
    }

    async fn record_gateway_call(&self, record: GatewayCallRecord) {
        self.post_log("/gateway-log", &record).await;
    }

    async fn log_transaction(&self, entry: TransactionLog) {
        self.post_log("/transaction-log", &entry).await;
    }

    async fn apply_invoice_payment(&self, payment: InvoicePayment) -> Result<(), HostError> {
        let resp = self
            .client
            .post(self.url(&format!("/invoices/{}/payments", payment.invoice_id)))
            .json(&payment)
            .send()
            .await
            .map_err(backend)?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(HostError::Backend(format!("host refused payment with status {}", resp.status())))
        }
    }

    async fn set_invoice_status(&self, invoice_id: InvoiceId, status: &str) -> Result<(), HostError> {
        let resp = self
            .client
            .put(self.url(&format!("/invoices/{invoice_id}/status")))
            .json(&json!({ "status": status }))
            .send()
            .await
            .map_err(backend)?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(HostError::Backend(format!("host refused status update with status {}", resp.status())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn invoice_lookup_maps_404_to_invalid_invoice() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| { when.method(GET).path("/invoices/41"); then.status(404); }).await;
        server.mock_async(|when, then| { when.method(GET).path("/invoices/42"); then.status(200); }).await;
        let host = HttpHost::new(Client::new(), server.base_url());
        assert!(matches!(host.validate_invoice_id("41").await, Err(HostError::InvalidInvoice(_))));
        assert_eq!(host.validate_invoice_id("42").await.unwrap(), InvoiceId(42));
    }

    #[tokio::test]
    async fn known_transaction_is_a_duplicate() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/transactions").query_param("id", "paym_seen");
            then.status(200);
        }).await;
        server.mock_async(|when, then| {
            when.method(GET).path("/transactions").query_param("id", "paym_new");
            then.status(404);
        }).await;
        let host = HttpHost::new(Client::new(), server.base_url());
        assert!(matches!(
            host.reject_duplicate_transaction("paym_seen").await,
            Err(HostError::DuplicateTransaction(_))
        ));
        host.reject_duplicate_transaction("paym_new").await.unwrap();
    }

    #[tokio::test]
    async fn status_update_is_forwarded() {
        let server = MockServer::start_async().await;
        let m = server.mock_async(|when, then| {
            when.method(PUT)
                .path("/invoices/9/status")
                .json_body(json!({ "status": "Payment Pending" }));
            then.status(204);
        }).await;
        let host = HttpHost::new(Client::new(), server.base_url());
        host.set_invoice_status(InvoiceId(9), "Payment Pending").await.unwrap();
        m.assert_async().await;
    }
}
