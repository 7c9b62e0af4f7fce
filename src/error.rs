use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayGridError {
    #[error("Unsupported token: {0}")]
    UnsupportedToken(String),

    #[error("Privacy client error: {0}")]
    PrivacyClient(String),

    #[error("Ledger gateway error: {0}")]
    LedgerGateway(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl PayGridError {
    /// Collaborator failures are transient by contract: the reconciliation
    /// loop treats them as "not yet observed" and retries on the next tick.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PayGridError::PrivacyClient(_) | PayGridError::LedgerGateway(_)
        )
    }
}
