use serde::{Deserialize, Serialize};

/// An issued API access credential. The raw secret is returned exactly once
/// at creation; only its one-way hash and a display hint are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCredential {
    pub id: String,
    /// Leading characters of the raw secret, for display in listings.
    pub hint: String,
    pub hashed_secret: String,
    pub name: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}
