//! The PayGrid engine: intent creation, boundary operations, and ownership
//! of the reconciliation watcher.

use crate::config::{Config, RUNNER_LEASE_MS};
use crate::error::PayGridError;
use crate::models::{
    token, AccessCredential, AnalyticsSnapshot, CreateIntentParams, PaymentIntent, PaymentMethod,
    PaymentStatus,
};
use crate::services::{
    Analytics, AuthService, Clock, DepositArtifact, DepositRequest, LedgerGateway, PoolReceipt,
    PrivacyClient, SystemClock, TransferRequest, Watcher, WatcherHandle, WithdrawRequest,
};
use crate::store::SqliteStore;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// A freshly created intent plus, for wallet signing, the deposit artifact
/// the customer's wallet must sign.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIntent {
    #[serde(flatten)]
    pub intent: PaymentIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<DepositArtifact>,
}

pub struct PayGrid {
    config: Config,
    store: Arc<SqliteStore>,
    ledger: Arc<dyn LedgerGateway>,
    privacy: Arc<dyn PrivacyClient>,
    auth: AuthService,
    analytics: Analytics,
    clock: Arc<dyn Clock>,
}

impl PayGrid {
    pub fn new(
        config: Config,
        ledger: Arc<dyn LedgerGateway>,
        privacy: Arc<dyn PrivacyClient>,
    ) -> Result<Self, PayGridError> {
        Self::with_clock(config, ledger, privacy, Arc::new(SystemClock))
    }

    /// Construct with an injected clock. Tests use this to steer expiry.
    pub fn with_clock(
        config: Config,
        ledger: Arc<dyn LedgerGateway>,
        privacy: Arc<dyn PrivacyClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PayGridError> {
        let store = Arc::new(SqliteStore::open(&config.db_path)?);
        let analytics = Analytics::new(store.clone(), clock.clone());

        let engine = Self {
            config,
            store,
            ledger,
            privacy,
            auth: AuthService::new(),
            analytics,
            clock,
        };
        engine.ensure_default_credential()?;
        Ok(engine)
    }

    /// A first boot has no credentials at all, which would lock every
    /// boundary caller out. Mint one and surface the raw secret this one
    /// time.
    fn ensure_default_credential(&self) -> Result<(), PayGridError> {
        if !self.store.credentials()?.is_empty() {
            return Ok(());
        }
        let (raw, credential) = self.auth.mint("default", self.clock.now_ms());
        self.store.insert_credential(&credential)?;
        tracing::warn!(
            "Created default API credential '{}': {} -- save it, it will not be shown again",
            credential.name,
            raw
        );
        Ok(())
    }

    /// Spawn the background reconciliation loop. The returned handle is the
    /// only way to stop it.
    pub fn start_watcher(&self) -> WatcherHandle {
        Watcher::new(
            self.store.clone(),
            self.ledger.clone(),
            self.clock.clone(),
            self.config.check_interval,
            RUNNER_LEASE_MS,
        )
        .spawn()
    }

    // ---- payment intents ----

    /// Create a payment intent. All-or-nothing: a collaborator failure
    /// aborts before anything is persisted.
    pub async fn create_payment_intent(
        &self,
        params: CreateIntentParams,
    ) -> Result<CreatedIntent, PayGridError> {
        let token = token::resolve(&params.token_symbol)?;
        let now = self.clock.now_ms();

        let mut wallet_address = None;
        let mut deposit = None;

        let amount = match params.method {
            PaymentMethod::ManualTransfer => {
                wallet_address = Some(self.ledger.generate_single_use_address().await?);
                params.amount
            }
            PaymentMethod::WalletSigning => {
                let amount_base_units = token::to_base_units(params.amount, token.decimals)?;
                let artifact = self
                    .privacy
                    .create_deposit_artifact(DepositRequest {
                        amount_base_units,
                        token_mint: token.mint.to_string(),
                        symbol: token.symbol.to_string(),
                        wallet_address: params.sender.clone().unwrap_or_default(),
                    })
                    .await?;
                // The pool reports the exact base-unit amount the artifact
                // encodes; the intent records its human-unit equivalent.
                let amount = token::from_base_units(artifact.amount_base_units, token.decimals);
                deposit = Some(artifact);
                amount
            }
        };

        let intent = PaymentIntent {
            id: Uuid::new_v4().to_string(),
            amount,
            token_mint: token.mint.to_string(),
            token_symbol: token.symbol.to_string(),
            method: params.method,
            status: PaymentStatus::AwaitingPayment,
            wallet_address,
            transaction_signature: None,
            destination: self.config.merchant_address.clone(),
            sender: params.sender,
            expires_at: now + self.config.payment_ttl_ms,
            created_at: now,
            metadata: params.metadata,
        };

        self.store.insert_payment(&intent)?;
        tracing::info!(
            "Created payment intent {} for {} {} via {:?}",
            intent.id,
            intent.amount,
            intent.token_symbol,
            intent.method
        );

        Ok(CreatedIntent { intent, deposit })
    }

    pub fn get_payment(&self, id: &str) -> Result<Option<PaymentIntent>, PayGridError> {
        self.store.payment(id)
    }

    pub fn list_payments(&self) -> Result<Vec<PaymentIntent>, PayGridError> {
        self.store.all_payments()
    }

    /// Record an externally signed transaction against an awaiting intent
    /// and move it to pending confirmation. Safe to repeat: the signature
    /// fills once and the status never regresses.
    pub fn attach_signature(
        &self,
        id: &str,
        signature: &str,
    ) -> Result<PaymentIntent, PayGridError> {
        let attached = self.store.attach_signature(id, signature)?;
        let payment = self
            .store
            .payment(id)?
            .ok_or_else(|| PayGridError::NotFound(format!("payment {id}")))?;
        if attached {
            tracing::info!("Signature {} attached to payment {}", signature, id);
        }
        Ok(payment)
    }

    pub fn get_analytics(&self, window_days: u32) -> Result<AnalyticsSnapshot, PayGridError> {
        self.analytics.snapshot(window_days)
    }

    // ---- access credentials ----

    /// Returns the raw secret (shown exactly once) and the stored record.
    pub fn create_access_credential(
        &self,
        name: &str,
    ) -> Result<(String, AccessCredential), PayGridError> {
        let (raw, credential) = self.auth.mint(name, self.clock.now_ms());
        self.store.insert_credential(&credential)?;
        tracing::info!("Created access credential {} ({})", credential.id, name);
        Ok((raw, credential))
    }

    pub fn list_access_credentials(&self) -> Result<Vec<AccessCredential>, PayGridError> {
        self.store.credentials()
    }

    pub fn revoke_access_credential(&self, id: &str) -> Result<(), PayGridError> {
        if !self.store.delete_credential(id)? {
            return Err(PayGridError::NotFound(format!("credential {id}")));
        }
        tracing::info!("Revoked access credential {}", id);
        Ok(())
    }

    pub fn validate_access_credential(&self, raw_secret: &str) -> Result<bool, PayGridError> {
        let valid = self
            .store
            .credentials()?
            .iter()
            .any(|c| self.auth.verify(raw_secret, &c.hashed_secret));
        Ok(valid)
    }

    /// `validate_access_credential` as a guard for boundary callers.
    pub fn authorize(&self, raw_secret: &str) -> Result<(), PayGridError> {
        if self.validate_access_credential(raw_secret)? {
            Ok(())
        } else {
            Err(PayGridError::Unauthorized)
        }
    }

    // ---- privacy pool pass-throughs ----

    pub async fn withdraw_from_privacy_pool(
        &self,
        token_symbol: &str,
        recipient: &str,
    ) -> Result<PoolReceipt, PayGridError> {
        let token = token::resolve(token_symbol)?;
        let receipt = self
            .privacy
            .withdraw(WithdrawRequest {
                symbol: token.symbol.to_string(),
                recipient: recipient.to_string(),
            })
            .await?;
        tracing::info!(
            "Privacy pool withdrawal of {} to {}: {}",
            token.symbol,
            recipient,
            receipt.reference
        );
        Ok(receipt)
    }

    pub async fn transfer_from_privacy_pool(
        &self,
        token_symbol: &str,
        sender: &str,
        amount: Decimal,
    ) -> Result<PoolReceipt, PayGridError> {
        let token = token::resolve(token_symbol)?;
        let receipt = self
            .privacy
            .transfer(TransferRequest {
                symbol: token.symbol.to_string(),
                sender: sender.to_string(),
                amount_base_units: token::to_base_units(amount, token.decimals)?,
            })
            .await?;
        tracing::info!(
            "Privacy pool transfer of {} {} from {}: {}",
            amount,
            token.symbol,
            sender,
            receipt.reference
        );
        Ok(receipt)
    }

    /// Shielded balance for an address, in human units.
    pub async fn privacy_pool_balance(
        &self,
        address: &str,
        token_symbol: &str,
    ) -> Result<Decimal, PayGridError> {
        let token = token::resolve(token_symbol)?;
        let balance = self.privacy.balance(address, token.symbol).await?;
        Ok(token::from_base_units(
            balance.available_base_units,
            token.decimals,
        ))
    }
}
