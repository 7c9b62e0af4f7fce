use crate::models::AccessCredential;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Number of leading raw-secret characters kept as the display hint
/// (`pg_` plus four characters).
const HINT_LEN: usize = 7;

/// Mints and verifies API access credentials. The raw secret is only ever
/// held by the caller; the store sees a one-way hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthService;

impl AuthService {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh credential. Returns the raw secret (shown exactly
    /// once) alongside the persistable record.
    pub fn mint(&self, name: &str, now_ms: i64) -> (String, AccessCredential) {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let raw = format!("pg_{}", hex::encode(bytes));

        let credential = AccessCredential {
            id: Uuid::new_v4().to_string(),
            hint: raw[..HINT_LEN].to_string(),
            hashed_secret: hash_secret(&raw),
            name: name.to_string(),
            created_at: now_ms,
        };

        (raw, credential)
    }

    /// Constant-time comparison of a presented secret against a stored hash.
    pub fn verify(&self, raw: &str, hashed_secret: &str) -> bool {
        let computed = hash_secret(raw);
        computed
            .as_bytes()
            .ct_eq(hashed_secret.as_bytes())
            .into()
    }
}

fn hash_secret(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_and_verify_round_trip() {
        let auth = AuthService::new();
        let (raw, credential) = auth.mint("ci", 1_000);

        assert!(raw.starts_with("pg_"));
        assert_eq!(credential.hint, &raw[..HINT_LEN]);
        assert_eq!(credential.name, "ci");
        assert_ne!(credential.hashed_secret, raw);
        assert!(auth.verify(&raw, &credential.hashed_secret));
    }

    #[test]
    fn wrong_secret_fails() {
        let auth = AuthService::new();
        let (_, credential) = auth.mint("ci", 1_000);
        assert!(!auth.verify("pg_not_the_secret", &credential.hashed_secret));
    }

    #[test]
    fn secrets_are_unique() {
        let auth = AuthService::new();
        let (a, _) = auth.mint("one", 0);
        let (b, _) = auth.mint("two", 0);
        assert_ne!(a, b);
    }
}
