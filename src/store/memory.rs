//! Process-local signup store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::signups::types::{InsertOutcome, NewSignup, SignupRecord};
use crate::store::{SignupStore, StoreResult};

/// In-memory store backed by a concurrent map keyed by email.
///
/// Each row carries an insertion sequence; listing orders by it rather than by
/// `created_at`, so rows created within one clock tick keep their order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<DashMap<String, (u64, SignupRecord)>>,
    seq: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a row by normalized email.
    pub fn get(&self, email: &str) -> Option<SignupRecord> {
        self.rows.get(email).map(|r| r.value().1.clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl SignupStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn insert_if_absent(&self, signup: NewSignup) -> StoreResult<InsertOutcome> {
        match self.rows.entry(signup.email.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::Duplicate),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((
                    seq,
                    SignupRecord {
                        email: signup.email,
                        created_at: Utc::now(),
                        ip_address: Some(signup.ip_address),
                    },
                ));
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.rows.len() as u64)
    }

    async fn list_recent(&self) -> StoreResult<Vec<SignupRecord>> {
        let mut rows: Vec<(u64, SignupRecord)> =
            self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|(a, _), (b, _)| b.cmp(a));
        Ok(rows.into_iter().map(|(_, record)| record).collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
