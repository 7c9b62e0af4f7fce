use crate::error::PayGridError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// External ledger collaborator: confirms signatures, searches a bounded
/// recent window of inbound activity, and mints single-use deposit
/// addresses.
///
/// Any failure surfaces as `PayGridError::LedgerGateway` and is treated by
/// the core as "not yet observed", never as a negative confirmation.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Whether the given transaction signature is confirmed on-chain.
    async fn confirm_signature(&self, signature: &str) -> Result<bool, PayGridError>;

    /// Search recent inbound transfers to `address` for one of at least
    /// `min_amount` (human units). Returns the transaction signature when
    /// found.
    async fn find_inbound_transfer(
        &self,
        address: &str,
        min_amount: Decimal,
    ) -> Result<Option<String>, PayGridError>;

    /// A freshly generated single-use deposit address.
    async fn generate_single_use_address(&self) -> Result<String, PayGridError>;
}
