//! Bounded per-account transfer history for structuring detection.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct Entry {
    timestamp: DateTime<Utc>,
    amount: Decimal,
}

/// Sliding window of recent transfers keyed by originating account.
///
/// Entries older than the window are evicted on each insert, so memory is
/// bounded by window length times transaction rate. A single engine-wide
/// lock is sufficient at bank-grade transaction rates.
#[derive(Debug, Default)]
pub struct AccountHistory {
    accounts: Mutex<HashMap<String, VecDeque<Entry>>>,
}

impl AccountHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transfer, then return how many transfers from this account
    /// (the new one included) fall inside `window` with an amount below
    /// `below`.
    pub fn record_and_count_below(
        &self,
        account: &str,
        timestamp: DateTime<Utc>,
        amount: Decimal,
        window: Duration,
        below: Decimal,
    ) -> usize {
        let mut accounts = match self.accounts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entries = accounts.entry(account.to_string()).or_default();
        let cutoff = timestamp - window;
        while entries.front().is_some_and(|e| e.timestamp < cutoff) {
            entries.pop_front();
        }
        entries.push_back(Entry { timestamp, amount });
        entries.iter().filter(|e| e.amount < below).count()
    }

    /// Number of accounts currently tracked.
    pub fn tracked_accounts(&self) -> usize {
        match self.accounts.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}
