use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One calendar-day revenue bucket. The series is zero-seeded so every day
/// in the window is present even when nothing settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub date: String,
    pub amount: Decimal,
}

/// Derived metrics over a trailing window; computed on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_revenue: Decimal,
    /// Percentage change against the equal-length preceding window.
    pub revenue_growth: Decimal,
    pub past_revenue: Decimal,
    pub transaction_count: u64,
    /// Settled intents as a percentage of all intents in the window.
    pub settlement_rate: Decimal,
    pub history: Vec<RevenuePoint>,
}
