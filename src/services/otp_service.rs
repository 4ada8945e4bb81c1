//! One-time login codes
//!
//! Codes are six digits, stored in a [`KeyValueStore`] under the phone
//! number with a TTL, and consumed on the first successful verification.
//! After [`MAX_FAILED_ATTEMPTS`] wrong guesses the outstanding code is burnt.
//! Delivery is a logging mock.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::cache::KeyValueStore;
use crate::utils::errors::AppResult;

/// Wrong guesses allowed per issued code
pub const MAX_FAILED_ATTEMPTS: u64 = 5;

#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

fn otp_key(phone: &str) -> String {
    format!("otp:{}", phone)
}

fn attempts_key(phone: &str) -> String {
    format!("otp_attempts:{}", phone)
}

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

impl OtpService {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh code for `phone`, replacing any outstanding one.
    pub async fn issue(&self, phone: &str) -> AppResult<String> {
        let code = generate_code();
        self.store.set(&otp_key(phone), &code, self.ttl).await?;
        self.store.delete(&attempts_key(phone)).await?;
        self.deliver(phone, &code);
        Ok(code)
    }

    fn deliver(&self, phone: &str, code: &str) {
        info!("📨 OTP for {}: {} (valid {}s)", phone, code, self.ttl.as_secs());
    }

    /// True when `code` matches the outstanding code; the code is consumed.
    pub async fn verify(&self, phone: &str, code: &str) -> AppResult<bool> {
        let key = otp_key(phone);
        let Some(expected) = self.store.get(&key).await? else {
            return Ok(false);
        };

        if expected != code {
            self.record_failure(phone).await?;
            return Ok(false);
        }

        // Only one of several concurrent logins with the same code gets it
        let taken = self.store.take(&key).await?;
        if taken.as_deref() != Some(code) {
            return Ok(false);
        }
        self.store.delete(&attempts_key(phone)).await?;
        Ok(true)
    }

    async fn record_failure(&self, phone: &str) -> AppResult<()> {
        let failures = self.store.increment(&attempts_key(phone), self.ttl).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            warn!("🔒 Too many wrong OTPs for {}, code revoked", phone);
            self.store.delete(&otp_key(phone)).await?;
            self.store.delete(&attempts_key(phone)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    fn service(ttl: u64) -> OtpService {
        OtpService::new(Arc::new(MemoryStore::new()), Duration::from_secs(ttl))
    }

    #[test]
    fn test_code_shape() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_code_verifies_once() {
        let otp = service(300);
        let code = otp.issue("9999999999").await.unwrap();
        assert!(otp.verify("9999999999", &code).await.unwrap());
        assert!(!otp.verify("9999999999", &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_outstanding_code() {
        let otp = service(300);
        let code = otp.issue("9999999999").await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };
        assert!(!otp.verify("9999999999", wrong).await.unwrap());
        assert!(!otp.verify("8888888888", &code).await.unwrap());
        assert!(otp.verify("9999999999", &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_code_revoked_after_failed_attempts() {
        let otp = service(300);
        let code = otp.issue("9999999999").await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..MAX_FAILED_ATTEMPTS {
            assert!(!otp.verify("9999999999", wrong).await.unwrap());
        }
        assert!(!otp.verify("9999999999", &code).await.unwrap());

        let fresh = otp.issue("9999999999").await.unwrap();
        assert!(otp.verify("9999999999", &fresh).await.unwrap());
    }

    #[tokio::test]
    async fn test_new_code_resets_failed_attempts() {
        let otp = service(300);
        otp.issue("9999999999").await.unwrap();
        for _ in 0..MAX_FAILED_ATTEMPTS - 1 {
            assert!(!otp.verify("9999999999", "abcdef").await.unwrap());
        }

        let code = otp.issue("9999999999").await.unwrap();
        assert!(!otp.verify("9999999999", "abcdef").await.unwrap());
        assert!(otp.verify("9999999999", &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_verifications_succeed_once() {
        let otp = service(300);
        let code = otp.issue("9999999999").await.unwrap();

        let (first, second) = tokio::join!(
            otp.verify("9999999999", &code),
            otp.verify("9999999999", &code)
        );
        assert_eq!([first.unwrap(), second.unwrap()].iter().filter(|ok| **ok).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_expires() {
        let otp = service(300);
        let code = otp.issue("9999999999").await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(!otp.verify("9999999999", &code).await.unwrap());
    }
}
