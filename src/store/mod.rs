//! Durable keyed storage for payment intents and access credentials.
//! The single source of truth for intent status.

use crate::error::PayGridError;
use crate::models::{AccessCredential, PaymentIntent, PaymentMethod, PaymentStatus};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS payments (
    id TEXT PRIMARY KEY,
    amount TEXT NOT NULL,
    token_mint TEXT NOT NULL,
    token_symbol TEXT NOT NULL,
    method TEXT NOT NULL,
    status TEXT NOT NULL,
    wallet_address TEXT,
    transaction_signature TEXT,
    destination TEXT NOT NULL,
    sender TEXT,
    expires_at INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    metadata TEXT
);
CREATE INDEX IF NOT EXISTS idx_payments_status ON payments(status);
CREATE INDEX IF NOT EXISTS idx_payments_created ON payments(created_at);

CREATE TABLE IF NOT EXISTS access_credentials (
    id TEXT PRIMARY KEY,
    hint TEXT NOT NULL,
    hashed_secret TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS watcher_lease (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    owner TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);
"#;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path. `:memory:` is accepted
    /// for tests.
    pub fn open(path: &str) -> Result<Self, PayGridError> {
        let conn = Connection::open(path)?;
        if path != ":memory:" {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, PayGridError> {
        self.conn.lock().map_err(|_| {
            PayGridError::Store(rusqlite::Error::InvalidParameterName(
                "lock poisoned".into(),
            ))
        })
    }

    // ---- payments ----

    pub fn insert_payment(&self, payment: &PaymentIntent) -> Result<(), PayGridError> {
        let metadata = payment.metadata.as_ref().map(|m| m.to_string());

        self.conn()?.execute(
            "INSERT INTO payments (id, amount, token_mint, token_symbol, method, status, \
             wallet_address, transaction_signature, destination, sender, expires_at, created_at, metadata) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                payment.id,
                payment.amount.to_string(),
                payment.token_mint,
                payment.token_symbol,
                payment.method.as_str(),
                payment.status.as_str(),
                payment.wallet_address,
                payment.transaction_signature,
                payment.destination,
                payment.sender,
                payment.expires_at,
                payment.created_at,
                metadata,
            ],
        )?;
        Ok(())
    }

    pub fn payment(&self, id: &str) -> Result<Option<PaymentIntent>, PayGridError> {
        let conn = self.conn()?;
        let payment = conn
            .query_row(
                "SELECT id, amount, token_mint, token_symbol, method, status, wallet_address, \
                 transaction_signature, destination, sender, expires_at, created_at, metadata \
                 FROM payments WHERE id = ?1",
                params![id],
                row_to_payment,
            )
            .optional()?;
        Ok(payment)
    }

    pub fn all_payments(&self) -> Result<Vec<PaymentIntent>, PayGridError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, amount, token_mint, token_symbol, method, status, wallet_address, \
             transaction_signature, destination, sender, expires_at, created_at, metadata \
             FROM payments ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_payment)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All intents the reconciliation loop still owns.
    pub fn pending_payments(&self) -> Result<Vec<PaymentIntent>, PayGridError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, amount, token_mint, token_symbol, method, status, wallet_address, \
             transaction_signature, destination, sender, expires_at, created_at, metadata \
             FROM payments WHERE status IN ('awaiting_payment', 'pending_confirmation') \
             ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map([], row_to_payment)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Advance an intent's status. The write is conditioned on the current
    /// status still being non-terminal, so a repeat (or a racing writer)
    /// can never move an intent backward or overwrite a terminal state.
    /// The signature, when given, only fills a previously empty value.
    /// Returns whether a row actually changed.
    pub fn transition_status(
        &self,
        id: &str,
        status: PaymentStatus,
        signature: Option<&str>,
    ) -> Result<bool, PayGridError> {
        let changed = self.conn()?.execute(
            "UPDATE payments \
             SET status = ?1, transaction_signature = COALESCE(transaction_signature, ?2) \
             WHERE id = ?3 AND status IN ('awaiting_payment', 'pending_confirmation')",
            params![status.as_str(), signature, id],
        )?;
        Ok(changed > 0)
    }

    /// Record an externally produced signature and move the intent to
    /// `pending_confirmation`. Only legal from `awaiting_payment`; an
    /// already-present signature is never overwritten.
    pub fn attach_signature(&self, id: &str, signature: &str) -> Result<bool, PayGridError> {
        let changed = self.conn()?.execute(
            "UPDATE payments \
             SET transaction_signature = COALESCE(transaction_signature, ?1), \
                 status = 'pending_confirmation' \
             WHERE id = ?2 AND status = 'awaiting_payment'",
            params![signature, id],
        )?;
        Ok(changed > 0)
    }

    // ---- access credentials ----

    pub fn insert_credential(&self, credential: &AccessCredential) -> Result<(), PayGridError> {
        self.conn()?.execute(
            "INSERT INTO access_credentials (id, hint, hashed_secret, name, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                credential.id,
                credential.hint,
                credential.hashed_secret,
                credential.name,
                credential.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn credentials(&self) -> Result<Vec<AccessCredential>, PayGridError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, hint, hashed_secret, name, created_at FROM access_credentials",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AccessCredential {
                id: row.get(0)?,
                hint: row.get(1)?,
                hashed_secret: row.get(2)?,
                name: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Revocation is a hard delete; validation reads the table on every
    /// check, so it takes effect immediately.
    pub fn delete_credential(&self, id: &str) -> Result<bool, PayGridError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM access_credentials WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ---- runner lease ----

    /// Acquire or renew the single-runner lease. Succeeds when the lease is
    /// free, expired, or already held by `owner`; otherwise the caller must
    /// skip its tick.
    pub fn try_acquire_lease(
        &self,
        owner: &str,
        now_ms: i64,
        ttl_ms: i64,
    ) -> Result<bool, PayGridError> {
        let changed = self.conn()?.execute(
            "INSERT INTO watcher_lease (id, owner, expires_at) VALUES (1, ?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET owner = excluded.owner, expires_at = excluded.expires_at \
             WHERE watcher_lease.owner = excluded.owner OR watcher_lease.expires_at <= ?3",
            params![owner, now_ms + ttl_ms, now_ms],
        )?;
        Ok(changed > 0)
    }
}

fn row_to_payment(row: &Row<'_>) -> rusqlite::Result<PaymentIntent> {
    let amount: String = row.get(1)?;
    let method: String = row.get(4)?;
    let status: String = row.get(5)?;
    let metadata: Option<String> = row.get(12)?;

    Ok(PaymentIntent {
        id: row.get(0)?,
        amount: Decimal::from_str(&amount)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
        token_mint: row.get(2)?,
        token_symbol: row.get(3)?,
        method: PaymentMethod::parse(&method).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("unknown payment method: {method}").into(),
            )
        })?,
        status: PaymentStatus::parse(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                Type::Text,
                format!("unknown payment status: {status}").into(),
            )
        })?,
        wallet_address: row.get(6)?,
        transaction_signature: row.get(7)?,
        destination: row.get(8)?,
        sender: row.get(9)?,
        expires_at: row.get(10)?,
        created_at: row.get(11)?,
        metadata: metadata
            .map(|m| {
                serde_json::from_str(&m).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e))
                })
            })
            .transpose()?,
    })
}
