use serde::Serialize;

pub const PROVIDER_CAPTURED: &str = "captured";
pub const PROVIDER_TO_CAPTURE: &str = "to_capture";

/// Refund states the provider reports for an accepted refund.
pub const REFUND_ACCEPTED: &[&str] = &["refund_sent", "refunded", "to_refund"];

/// Local outcome of a checkout return. Never a provider-native value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionStatus {
    Success,
    Pending,
    Failure,
    HashVerificationFailure,
}

impl TransactionStatus {
    pub fn from_provider(status: &str) -> Self {
        match status {
            PROVIDER_CAPTURED => TransactionStatus::Success,
            PROVIDER_TO_CAPTURE => TransactionStatus::Pending,
            _ => TransactionStatus::Failure,
        }
    }

    /// Label written to the host transaction log.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "Success",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failure => "Failure",
            TransactionStatus::HashVerificationFailure => "Hash Verification Failure",
        }
    }

    /// Query flag the invoice view understands.
    pub fn redirect_flag(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "paymentsuccess",
            TransactionStatus::Pending => "paymentinititated",
            TransactionStatus::Failure | TransactionStatus::HashVerificationFailure => "paymentfailed",
        }
    }

    pub fn metric_label(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "success",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failure => "failure",
            TransactionStatus::HashVerificationFailure => "hash_verification_failure",
        }
    }
}

pub fn is_refund_accepted(status: &str) -> bool {
    REFUND_ACCEPTED.contains(&status)
}
