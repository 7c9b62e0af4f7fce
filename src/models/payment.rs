use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    AwaitingPayment,
    PendingConfirmation,
    Settled,
    Expired,
    Failed,
}

impl PaymentStatus {
    /// Terminal statuses are never overwritten; the write site enforces this.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentStatus::Settled | PaymentStatus::Expired | PaymentStatus::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::AwaitingPayment => "awaiting_payment",
            PaymentStatus::PendingConfirmation => "pending_confirmation",
            PaymentStatus::Settled => "settled",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "awaiting_payment" => Some(PaymentStatus::AwaitingPayment),
            "pending_confirmation" => Some(PaymentStatus::PendingConfirmation),
            "settled" => Some(PaymentStatus::Settled),
            "expired" => Some(PaymentStatus::Expired),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    WalletSigning,
    ManualTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::WalletSigning => "wallet_signing",
            PaymentMethod::ManualTransfer => "manual_transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wallet_signing" => Some(PaymentMethod::WalletSigning),
            "manual_transfer" => Some(PaymentMethod::ManualTransfer),
            _ => None,
        }
    }
}

/// A request to receive a specific amount of a specific asset, with a
/// deadline. Created once, mutated only by the reconciliation loop, never
/// deleted (it is the audit record).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    /// Human-readable units of the token, not base units.
    pub amount: Decimal,
    pub token_mint: String,
    pub token_symbol: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Single-use deposit address, manual transfers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Filled at most once: only empty -> value writes are permitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_signature: Option<String>,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Epoch milliseconds.
    pub expires_at: i64,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Caller-supplied parameters for `PayGrid::create_payment_intent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentParams {
    pub amount: Decimal,
    pub token_symbol: String,
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}
