//! PostgreSQL implementation of PaymentRepository.

use crate::domain::foundation::{PackageId, PaymentId, StoreError, Timestamp, UserId};
use crate::domain::gateway::GatewayProvider;
use crate::domain::payment::{PaymentKind, PaymentRecord, PaymentStatus};
use crate::ports::PaymentRepository;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const PROVIDER_REFERENCE_UNIQUE: &str = "payments_provider_reference_key";

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Option<Uuid>,
    package_id: Uuid,
    amount: f64,
    currency: String,
    status: String,
    provider: String,
    provider_reference: Option<String>,
    kind: String,
    metadata: serde_json::Value,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;
        let provider = row
            .provider
            .parse::<GatewayProvider>()
            .map_err(|e| StoreError::database(e.to_string()))?;
        let kind = parse_kind(&row.kind)?;

        Ok(PaymentRecord {
            id: PaymentId::from_uuid(row.id),
            user_id: row.user_id.map(UserId::from_uuid),
            package_id: PackageId::from_uuid(row.package_id),
            amount: row.amount,
            currency: row.currency,
            status,
            provider,
            provider_reference: row.provider_reference,
            kind,
            metadata: row.metadata,
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, StoreError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "completed" => Ok(PaymentStatus::Completed),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(StoreError::database(format!("invalid payment status: {}", s))),
    }
}

fn parse_kind(s: &str) -> Result<PaymentKind, StoreError> {
    match s.to_lowercase().as_str() {
        "membership" => Ok(PaymentKind::Membership),
        "addon_upgrade" => Ok(PaymentKind::AddonUpgrade),
        "guest_referral" => Ok(PaymentKind::GuestReferral),
        _ => Err(StoreError::database(format!("invalid payment kind: {}", s))),
    }
}

const SELECT_COLUMNS: &str = "id, user_id, package_id, amount, currency, status, provider, \
     provider_reference, kind, metadata, paid_at, created_at, updated_at";

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE provider_reference = $1",
            SELECT_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to find payment: {}", e)))?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn find_recent_pending_for_user(
        &self,
        user_id: &UserId,
        window: Duration,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let cutoff = Utc::now() - window;

        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments \
             WHERE user_id = $1 AND status = 'pending' AND created_at > $2 \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to find pending payment: {}", e)))?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn set_provider_reference(
        &self,
        id: &PaymentId,
        reference: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE payments SET provider_reference = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(reference)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to backfill reference: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("payment"));
        }
        Ok(())
    }

    async fn insert(&self, record: &PaymentRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, package_id, amount, currency, status, provider,
                provider_reference, kind, metadata, paid_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_ref().map(|u| *u.as_uuid()))
        .bind(record.package_id.as_uuid())
        .bind(record.amount)
        .bind(&record.currency)
        .bind(record.status.as_str())
        .bind(record.provider.as_str())
        .bind(&record.provider_reference)
        .bind(record.kind.as_str())
        .bind(&record.metadata)
        .bind(record.paid_at.as_ref().map(|t| *t.as_datetime()))
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(PROVIDER_REFERENCE_UNIQUE) {
                    let reference = record.provider_reference.clone().unwrap_or_default();
                    return StoreError::duplicate_reference(reference);
                }
            }
            StoreError::database(format!("failed to insert payment: {}", e))
        })?;

        Ok(())
    }

    async fn mark_completed(&self, id: &PaymentId, paid_at: Timestamp) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'completed', paid_at = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(paid_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to complete payment: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("payment"));
        }
        Ok(())
    }

    async fn mark_failed(&self, id: &PaymentId) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE payments SET status = 'failed', updated_at = now() WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::database(format!("failed to fail payment: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("payment"));
        }
        Ok(())
    }

    async fn bind_user(&self, id: &PaymentId, user_id: &UserId) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE payments SET user_id = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_uuid())
                .bind(user_id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::database(format!("failed to bind user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("payment"));
        }
        Ok(())
    }
}
