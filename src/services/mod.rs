pub mod analytics;
pub mod auth;
pub mod ledger;
pub mod privacy;
pub mod watcher;

pub use analytics::Analytics;
pub use auth::AuthService;
pub use ledger::LedgerGateway;
pub use privacy::{
    DepositArtifact, DepositRequest, PoolBalance, PoolReceipt, PrivacyClient, TransferRequest,
    WithdrawRequest,
};
pub use watcher::{Clock, SystemClock, Watcher, WatcherHandle};
