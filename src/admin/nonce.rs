use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Action the settings form tokens are issued for
pub const ADMIN_ACTION: &str = "cmnotifier_admin";

/// Tokens rotate every tick; the previous tick stays valid.
const TICK_SECONDS: i64 = 12 * 60 * 60;

/// Issues and checks anti-forgery tokens bound to an action.
pub struct NonceGuard {
    secret: Vec<u8>,
}

impl NonceGuard {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Guard with a per-process secret; tokens die with the process.
    pub fn random() -> Self {
        let secret: [u8; 32] = rand::rng().random();
        Self::new(secret)
    }

    pub fn issue(&self, action: &str) -> String {
        self.issue_at(action, Utc::now().timestamp())
    }

    pub fn verify(&self, action: &str, token: &str) -> bool {
        self.verify_at(action, token, Utc::now().timestamp())
    }

    fn issue_at(&self, action: &str, unix_seconds: i64) -> String {
        self.token_for_tick(action, tick(unix_seconds))
    }

    fn verify_at(&self, action: &str, token: &str, unix_seconds: i64) -> bool {
        if token.is_empty() {
            return false;
        }
        let current = tick(unix_seconds);
        [current, current - 1]
            .iter()
            .any(|&t| constant_time_eq(&self.token_for_tick(action, t), token))
    }

    fn token_for_tick(&self, action: &str, tick: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update([0u8]);
        hasher.update(action.as_bytes());
        hasher.update([0u8]);
        hasher.update(tick.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

fn tick(unix_seconds: i64) -> i64 {
    unix_seconds.div_euclid(TICK_SECONDS)
}

pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}
