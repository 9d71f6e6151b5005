//! Element Id Prefixes
//!
//! Each helper scopes the ids it generates with a short hex prefix so two
//! renders of the same template on one page do not collide.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const PREFIX_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPrefix(String);

impl IdPrefix {
    /// Fresh prefix seeded from a v4 UUID (OS randomness).
    pub fn random() -> Self {
        Self::from_seed(&Uuid::new_v4().to_string())
    }

    /// Deterministic prefix: the first five hex digits of SHA-256(seed), then `-`.
    pub fn from_seed(seed: &str) -> Self {
        let digest = sha256_hex(seed.as_bytes());
        Self(format!("{}-", &digest[..PREFIX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn apply(&self, id: &str) -> String {
        format!("{}{}", self.0, id)
    }
}

impl Default for IdPrefix {
    fn default() -> Self {
        Self::random()
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}
