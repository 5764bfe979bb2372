use std::sync::Mutex;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

use crate::models::audit::{AuditEntry, CreateAuditEntry};

/// Append-only store of send attempts. The surrounding application supplies
/// a persistent implementation; this crate only defines the contract and an
/// in-process store.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert(&self, entry: CreateAuditEntry) -> Result<(), Error>;

    /// Entries filed under a recipient identifier, newest first.
    async fn for_recipient(&self, recipient_id: &str) -> Result<Vec<AuditEntry>, Error>;
}

/// In-memory audit store. Suitable for tests and single-process deployments
/// that do not need the history to survive a restart.
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert(&self, entry: CreateAuditEntry) -> Result<(), Error> {
        let entry = entry.into_entry();

        debug!(
            resource_id = %entry.resource_id,
            status = %entry.status,
            "Audit entry recorded"
        );

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Audit store lock poisoned"))?;
        entries.push(entry);

        Ok(())
    }

    async fn for_recipient(&self, recipient_id: &str) -> Result<Vec<AuditEntry>, Error> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Audit store lock poisoned"))?;

        let mut matched: Vec<AuditEntry> = entries
            .iter()
            .filter(|entry| entry.resource_id == recipient_id)
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matched)
    }
}
