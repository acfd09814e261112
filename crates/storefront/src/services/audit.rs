//! Non-blocking audit trail sink.
//!
//! Checkout code records audit events through [`AuditLog`]; entries go onto
//! a bounded queue and a background task flushes them to the `audit_log`
//! table. Recording never blocks and never fails the caller: a full or
//! closed queue drops the entry with a warning.

use sqlx::PgPool;
use tokio::sync::mpsc;

use sidra_core::UserId;

use crate::db::audit::{AuditEntry, AuditLevel, AuditLogRepository};

/// Queue capacity before entries are dropped.
const QUEUE_CAPACITY: usize = 256;

/// Handle to the audit sink. Cheap to clone.
#[derive(Clone)]
pub struct AuditLog {
    tx: Option<mpsc::Sender<AuditEntry>>,
}

impl AuditLog {
    /// Spawn the background flush task and return a handle.
    #[must_use]
    pub fn spawn(pool: PgPool) -> Self {
        let (tx, mut rx) = mpsc::channel::<AuditEntry>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let repo = AuditLogRepository::new(&pool);
                if let Err(e) = repo.insert(&entry).await {
                    tracing::warn!(error = %e, "Failed to persist audit entry");
                }
            }
        });

        Self { tx: Some(tx) }
    }

    /// A sink that discards everything (tests, tooling).
    #[must_use]
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    /// Record an informational event.
    pub fn info(
        &self,
        category: &str,
        message: impl Into<String>,
        user_id: Option<UserId>,
        context: serde_json::Value,
    ) {
        self.record(AuditLevel::Info, category, message.into(), user_id, context);
    }

    /// Record an error event.
    pub fn error(
        &self,
        category: &str,
        message: impl Into<String>,
        user_id: Option<UserId>,
        context: serde_json::Value,
    ) {
        self.record(AuditLevel::Error, category, message.into(), user_id, context);
    }

    fn record(
        &self,
        level: AuditLevel,
        category: &str,
        message: String,
        user_id: Option<UserId>,
        context: serde_json::Value,
    ) {
        let Some(tx) = &self.tx else {
            return;
        };

        let entry = AuditEntry {
            level,
            category: category.to_owned(),
            message,
            user_id,
            context,
        };

        if let Err(e) = tx.try_send(entry) {
            tracing::warn!(error = %e, "Audit queue unavailable, dropping entry");
        }
    }

    #[cfg(test)]
    fn from_sender(tx: mpsc::Sender<AuditEntry>) -> Self {
        Self { tx: Some(tx) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_disabled_sink_is_a_no_op() {
        let log = AuditLog::disabled();
        log.info("checkout", "started", None, json!({}));
        log.error("checkout", "failed", Some(UserId::new(1)), json!({}));
    }

    #[tokio::test]
    async fn test_entries_reach_the_queue() {
        let (tx, mut rx) = mpsc::channel(4);
        let log = AuditLog::from_sender(tx);

        log.info(
            "checkout",
            "draft created",
            None,
            json!({"orderCode": "ORD260826K3XP9"}),
        );

        let entry = rx.recv().await.expect("entry queued");
        assert_eq!(entry.level, AuditLevel::Info);
        assert_eq!(entry.category, "checkout");
        assert_eq!(entry.message, "draft created");
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (tx, _rx) = mpsc::channel(1);
        let log = AuditLog::from_sender(tx);

        // Second entry overflows the capacity-1 queue; must not block or panic.
        log.info("checkout", "first", None, json!({}));
        log.info("checkout", "second", None, json!({}));
    }

    #[tokio::test]
    async fn test_closed_queue_drops_without_panicking() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let log = AuditLog::from_sender(tx);

        log.error("checkout", "after shutdown", None, json!({}));
    }
}
