use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Intents expire this long after creation.
pub const PAYMENT_TTL_MS: i64 = 30 * 60 * 1000;

/// Default reconciliation tick interval.
pub const CHECK_INTERVAL_SECS: u64 = 10;

/// Reconciliation runner lease lifetime. Must comfortably exceed the tick
/// interval so a healthy runner never loses its own lease.
pub const RUNNER_LEASE_MS: i64 = 30 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    MainnetBeta,
    Devnet,
    Testnet,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub db_path: String,

    // Merchant settlement address, recorded as `destination` on every intent
    pub merchant_address: String,

    pub check_interval: Duration,
    pub payment_ttl_ms: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            network: Self::parse_network()?,
            db_path: std::env::var("PAYGRID_DB_PATH")
                .unwrap_or_else(|_| "./paygrid.db".to_string()),
            merchant_address: std::env::var("MERCHANT_WALLET_ADDRESS")
                .context("MERCHANT_WALLET_ADDRESS required")?,
            check_interval: Duration::from_secs(
                std::env::var("PAYGRID_CHECK_INTERVAL_SECS")
                    .unwrap_or_else(|_| CHECK_INTERVAL_SECS.to_string())
                    .parse()
                    .context("Invalid PAYGRID_CHECK_INTERVAL_SECS")?,
            ),
            payment_ttl_ms: std::env::var("PAYGRID_PAYMENT_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<i64>()
                .map(|minutes| minutes * 60 * 1000)
                .context("Invalid PAYGRID_PAYMENT_TTL_MINUTES")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_network() -> Result<Network> {
        let network =
            std::env::var("PAYGRID_NETWORK").unwrap_or_else(|_| "mainnet-beta".to_string());

        match network.to_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            _ => bail!("Unknown network: {}", network),
        }
    }

    fn validate(&self) -> Result<()> {
        // Base58-encoded public keys are 32-44 characters
        if self.merchant_address.len() < 32 {
            bail!("MERCHANT_WALLET_ADDRESS is not a valid address");
        }
        if self.payment_ttl_ms <= 0 {
            bail!("Payment TTL must be positive");
        }

        tracing::info!(
            "Configuration validated for {:?} network, store at {}",
            self.network,
            self.db_path
        );

        Ok(())
    }
}
