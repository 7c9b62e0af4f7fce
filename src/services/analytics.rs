//! Read-side metrics over the payment store. Decision-free: never mutates
//! anything.

use crate::error::PayGridError;
use crate::models::{AnalyticsSnapshot, PaymentStatus, RevenuePoint};
use crate::services::watcher::Clock;
use crate::store::SqliteStore;
use chrono::TimeZone;
use rust_decimal::Decimal;
use std::sync::Arc;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub struct Analytics {
    store: Arc<SqliteStore>,
    clock: Arc<dyn Clock>,
}

impl Analytics {
    pub fn new(store: Arc<SqliteStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Revenue, growth, and settlement-rate metrics over the trailing
    /// `window_days`.
    pub fn snapshot(&self, window_days: u32) -> Result<AnalyticsSnapshot, PayGridError> {
        let days = i64::from(window_days.max(1));
        let now = self.clock.now_ms();
        let start = now - days * DAY_MS;
        let prev_start = start - days * DAY_MS;

        let payments = self.store.all_payments()?;

        let total_revenue: Decimal = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Settled && p.created_at >= start)
            .map(|p| p.amount)
            .sum();

        let past_revenue: Decimal = payments
            .iter()
            .filter(|p| {
                p.status == PaymentStatus::Settled
                    && p.created_at >= prev_start
                    && p.created_at < start
            })
            .map(|p| p.amount)
            .sum();

        let hundred = Decimal::from(100);
        let revenue_growth = if past_revenue > Decimal::ZERO {
            (total_revenue - past_revenue) / past_revenue * hundred
        } else if total_revenue > Decimal::ZERO {
            hundred
        } else {
            Decimal::ZERO
        };

        // Zero-seed one bucket per calendar day, oldest first, so the
        // series has no gaps.
        let mut history: Vec<RevenuePoint> = (0..days)
            .rev()
            .map(|i| RevenuePoint {
                date: bucket_label(now - i * DAY_MS),
                amount: Decimal::ZERO,
            })
            .collect();

        for payment in payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Settled && p.created_at >= start)
        {
            let label = bucket_label(payment.created_at);
            if let Some(point) = history.iter_mut().find(|pt| pt.date == label) {
                point.amount += payment.amount;
            }
        }

        let in_window = payments.iter().filter(|p| p.created_at >= start).count();
        let settled_in_window = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Settled && p.created_at >= start)
            .count();

        let settlement_rate = if in_window > 0 {
            Decimal::from(settled_in_window) / Decimal::from(in_window) * hundred
        } else {
            Decimal::ZERO
        };

        Ok(AnalyticsSnapshot {
            total_revenue,
            revenue_growth,
            past_revenue,
            transaction_count: in_window as u64,
            settlement_rate,
            history,
        })
    }
}

/// Calendar-day bucket label, e.g. "Aug 23".
fn bucket_label(ms: i64) -> String {
    chrono::Utc
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%b %-d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentIntent, PaymentMethod};

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    const NOW: i64 = 20_000 * DAY_MS;

    fn analytics(store: &Arc<SqliteStore>) -> Analytics {
        Analytics::new(store.clone(), Arc::new(FixedClock(NOW)))
    }

    fn insert(store: &SqliteStore, id: &str, amount: &str, status: PaymentStatus, created_at: i64) {
        store
            .insert_payment(&PaymentIntent {
                id: id.to_string(),
                amount: amount.parse().unwrap(),
                token_mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
                token_symbol: "USDC".to_string(),
                method: PaymentMethod::ManualTransfer,
                status,
                wallet_address: None,
                transaction_signature: None,
                destination: "MerchantDest1111111111111111111111111111111".to_string(),
                sender: None,
                expires_at: created_at + 30 * 60 * 1000,
                created_at,
                metadata: None,
            })
            .unwrap();
    }

    #[test]
    fn empty_store_yields_zeroes_with_full_history() {
        let store = Arc::new(SqliteStore::open(":memory:").unwrap());
        let snapshot = analytics(&store).snapshot(30).unwrap();

        assert_eq!(snapshot.total_revenue, Decimal::ZERO);
        assert_eq!(snapshot.revenue_growth, Decimal::ZERO);
        assert_eq!(snapshot.settlement_rate, Decimal::ZERO);
        assert_eq!(snapshot.transaction_count, 0);
        assert_eq!(snapshot.history.len(), 30);
        assert!(snapshot.history.iter().all(|p| p.amount == Decimal::ZERO));
    }

    #[test]
    fn growth_is_100_when_prior_window_empty() {
        let store = Arc::new(SqliteStore::open(":memory:").unwrap());
        insert(&store, "p1", "50", PaymentStatus::Settled, NOW - DAY_MS);

        let snapshot = analytics(&store).snapshot(30).unwrap();
        assert_eq!(snapshot.total_revenue, Decimal::from(50));
        assert_eq!(snapshot.past_revenue, Decimal::ZERO);
        assert_eq!(snapshot.revenue_growth, Decimal::from(100));
    }

    #[test]
    fn growth_compares_equal_length_windows() {
        let store = Arc::new(SqliteStore::open(":memory:").unwrap());
        // Prior window: 100, current window: 150
        insert(&store, "old", "100", PaymentStatus::Settled, NOW - 35 * DAY_MS);
        insert(&store, "new-a", "90", PaymentStatus::Settled, NOW - 10 * DAY_MS);
        insert(&store, "new-b", "60", PaymentStatus::Settled, NOW - 2 * DAY_MS);

        let snapshot = analytics(&store).snapshot(30).unwrap();
        assert_eq!(snapshot.total_revenue, Decimal::from(150));
        assert_eq!(snapshot.past_revenue, Decimal::from(100));
        assert_eq!(snapshot.revenue_growth, Decimal::from(50));
    }

    #[test]
    fn settlement_rate_counts_all_intents_in_window() {
        let store = Arc::new(SqliteStore::open(":memory:").unwrap());
        insert(&store, "s1", "10", PaymentStatus::Settled, NOW - DAY_MS);
        insert(&store, "s2", "10", PaymentStatus::Settled, NOW - DAY_MS);
        insert(&store, "e1", "10", PaymentStatus::Expired, NOW - DAY_MS);
        insert(&store, "a1", "10", PaymentStatus::AwaitingPayment, NOW - DAY_MS);

        let snapshot = analytics(&store).snapshot(30).unwrap();
        assert_eq!(snapshot.transaction_count, 4);
        assert_eq!(snapshot.settlement_rate, Decimal::from(50));
    }

    #[test]
    fn history_accumulates_on_creation_day() {
        let store = Arc::new(SqliteStore::open(":memory:").unwrap());
        insert(&store, "a", "1.5", PaymentStatus::Settled, NOW - 3 * DAY_MS);
        insert(&store, "b", "2.5", PaymentStatus::Settled, NOW - 3 * DAY_MS);
        // Expired intents contribute nothing
        insert(&store, "c", "9", PaymentStatus::Expired, NOW - 3 * DAY_MS);

        let snapshot = analytics(&store).snapshot(7).unwrap();
        assert_eq!(snapshot.history.len(), 7);

        let label = bucket_label(NOW - 3 * DAY_MS);
        let point = snapshot.history.iter().find(|p| p.date == label).unwrap();
        assert_eq!(point.amount, "4".parse::<Decimal>().unwrap());

        let nonzero = snapshot
            .history
            .iter()
            .filter(|p| p.amount > Decimal::ZERO)
            .count();
        assert_eq!(nonzero, 1);
    }
}
