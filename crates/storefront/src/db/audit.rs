//! Audit log repository.
//!
//! Only the background audit sink writes here; checkout code never talks to
//! this table directly.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use sidra_core::UserId;

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    Info,
    Error,
}

impl AuditLevel {
    /// Database representation of this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// One audit trail entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Severity.
    pub level: AuditLevel,
    /// Event category (e.g. "checkout").
    pub category: String,
    /// Human-readable message.
    pub message: String,
    /// User associated with the event, if known.
    pub user_id: Option<UserId>,
    /// Structured context (order code, error code, ...).
    pub context: serde_json::Value,
}

/// Repository for audit log writes.
pub struct AuditLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditLogRepository<'a> {
    /// Create a new audit log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert one audit entry.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the insert fails; the sink logs and drops
    /// the entry in that case.
    pub async fn insert(&self, entry: &AuditEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO storefront.audit_log (level, category, message, user_id, context)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(entry.level.as_str())
        .bind(&entry.category)
        .bind(&entry.message)
        .bind(entry.user_id)
        .bind(&entry.context)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
