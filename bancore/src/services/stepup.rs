//! Step-up verifier - one-time codes gating withdrawals
//!
//! Challenges are tracked per account: issuing a code for one account never
//! invalidates another account's pending challenge. A challenge is
//! single-use and expires after a configurable lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::domain::result::Result;
use crate::ports::SmsGateway;

/// Length of a one-time verification code (external contract)
pub const CHALLENGE_LEN: usize = 8;

const CHALLENGE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default challenge lifetime
pub fn default_ttl() -> Duration {
    Duration::minutes(5)
}

#[derive(Debug, Clone)]
struct PendingChallenge {
    code: String,
    issued_at: DateTime<Utc>,
}

/// Issues and checks one-time verification codes
pub struct StepUpVerifier {
    sms: Arc<dyn SmsGateway>,
    pending: Mutex<HashMap<String, PendingChallenge>>,
    ttl: Duration,
}

impl StepUpVerifier {
    pub fn new(sms: Arc<dyn SmsGateway>, ttl: Duration) -> Self {
        Self {
            sms,
            pending: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Generate an 8-character alphanumeric code
    fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        (0..CHALLENGE_LEN)
            .map(|_| CHALLENGE_CHARSET[rng.gen_range(0..CHALLENGE_CHARSET.len())] as char)
            .collect()
    }

    /// Issue a challenge for an account and deliver it to the owner's phone
    ///
    /// The challenge only becomes pending if delivery succeeds; an SMS
    /// failure propagates and leaves no pending state. A new challenge for
    /// the same account supersedes any previous one.
    pub fn issue_challenge(&self, account_code: &str, phone: &str) -> Result<String> {
        let code = Self::generate_code();
        self.sms
            .send(phone, &format!("Your verification code is: {code}"))
            .inspect_err(|_| warn!(account = %account_code, "challenge delivery failed"))?;

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.insert(
            account_code.to_string(),
            PendingChallenge {
                code: code.clone(),
                issued_at: Utc::now(),
            },
        );
        info!(account = %account_code, "challenge issued");
        Ok(code)
    }

    /// Check a submitted code against the account's pending challenge
    ///
    /// True iff an unexpired challenge is pending for that account and the
    /// code matches exactly (case-sensitive). A successful check consumes
    /// the challenge.
    pub fn verify(&self, account_code: &str, submitted: &str) -> bool {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(challenge) = pending.get(account_code) else {
            return false;
        };
        if Utc::now() - challenge.issued_at > self.ttl {
            pending.remove(account_code);
            return false;
        }
        if challenge.code != submitted {
            return false;
        }
        pending.remove(account_code);
        true
    }

    /// Whether an unexpired challenge is pending for the account
    pub fn has_pending(&self, account_code: &str) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending
            .get(account_code)
            .is_some_and(|c| Utc::now() - c.issued_at <= self.ttl)
    }
}
