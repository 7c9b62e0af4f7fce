use crate::error::PayGridError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parameters for producing a shielded-pool deposit artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    /// Amount in the asset's smallest denomination unit.
    pub amount_base_units: u64,
    pub token_mint: String,
    pub symbol: String,
    /// The depositor's wallet, which will sign the artifact.
    pub wallet_address: String,
}

/// An unsigned deposit transaction produced by the pool, plus the exact
/// base-unit amount it encodes (fees may make it differ from the request).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositArtifact {
    /// Serialized transaction for the caller's wallet to sign.
    pub artifact: String,
    pub amount_base_units: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub symbol: String,
    pub sender: String,
    pub amount_base_units: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub symbol: String,
    pub recipient: String,
}

/// Pool-side acknowledgement of a transfer or withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolReceipt {
    pub reference: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolBalance {
    pub available_base_units: u64,
}

/// Privacy-pool collaborator. All amounts cross this boundary in base
/// units; conversion to and from human units happens in the core through
/// the canonical token table.
#[async_trait]
pub trait PrivacyClient: Send + Sync {
    async fn create_deposit_artifact(
        &self,
        request: DepositRequest,
    ) -> Result<DepositArtifact, PayGridError>;

    async fn transfer(&self, request: TransferRequest) -> Result<PoolReceipt, PayGridError>;

    async fn withdraw(&self, request: WithdrawRequest) -> Result<PoolReceipt, PayGridError>;

    async fn balance(&self, address: &str, symbol: &str) -> Result<PoolBalance, PayGridError>;
}
