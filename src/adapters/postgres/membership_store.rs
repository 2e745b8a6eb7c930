//! PostgreSQL implementation of MembershipStore.

use crate::domain::foundation::{MembershipId, PackageId, PaymentId, StoreError, Timestamp, UserId};
use crate::domain::membership::{MemberType, MembershipPackage, MembershipRecord};
use crate::ports::MembershipStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the MembershipStore port.
pub struct PostgresMembershipStore {
    pool: PgPool,
}

impl PostgresMembershipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    name: String,
    member_type: String,
    duration_months: i32,
    referral_rate: f64,
}

impl TryFrom<PackageRow> for MembershipPackage {
    type Error = StoreError;

    fn try_from(row: PackageRow) -> Result<Self, Self::Error> {
        let member_type = parse_member_type(&row.member_type)?;
        let duration_months = u32::try_from(row.duration_months)
            .map_err(|_| StoreError::database(format!("negative duration: {}", row.duration_months)))?;

        Ok(MembershipPackage {
            id: PackageId::from_uuid(row.id),
            name: row.name,
            member_type,
            duration_months,
            referral_rate: row.referral_rate,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    user_id: Uuid,
    package_id: Uuid,
    payment_id: Uuid,
    starts_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    active: bool,
    addon: bool,
    lifetime_access: bool,
}

impl From<MembershipRow> for MembershipRecord {
    fn from(row: MembershipRow) -> Self {
        MembershipRecord {
            id: MembershipId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            package_id: PackageId::from_uuid(row.package_id),
            payment_id: PaymentId::from_uuid(row.payment_id),
            starts_at: Timestamp::from_datetime(row.starts_at),
            expires_at: Timestamp::from_datetime(row.expires_at),
            active: row.active,
            addon: row.addon,
            lifetime_access: row.lifetime_access,
        }
    }
}

fn parse_member_type(s: &str) -> Result<MemberType, StoreError> {
    match s.to_lowercase().as_str() {
        "learner" => Ok(MemberType::Learner),
        "affiliate" => Ok(MemberType::Affiliate),
        _ => Err(StoreError::database(format!("invalid member type: {}", s))),
    }
}

#[async_trait]
impl MembershipStore for PostgresMembershipStore {
    async fn find_package(&self, id: &PackageId) -> Result<Option<MembershipPackage>, StoreError> {
        let row: Option<PackageRow> = sqlx::query_as(
            "SELECT id, name, member_type, duration_months, referral_rate \
             FROM membership_packages WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to find package: {}", e)))?;

        row.map(MembershipPackage::try_from).transpose()
    }

    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MembershipRecord>, StoreError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            "SELECT id, user_id, package_id, payment_id, starts_at, expires_at, \
                    active, addon, lifetime_access \
             FROM memberships \
             WHERE user_id = $1 AND active = true \
               AND (lifetime_access = true OR expires_at > now()) \
             ORDER BY starts_at DESC LIMIT 1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to find membership: {}", e)))?;

        Ok(row.map(MembershipRecord::from))
    }

    async fn insert(&self, record: &MembershipRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO memberships (
                id, user_id, package_id, payment_id, starts_at, expires_at,
                active, addon, lifetime_access
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(record.package_id.as_uuid())
        .bind(record.payment_id.as_uuid())
        .bind(record.starts_at.as_datetime())
        .bind(record.expires_at.as_datetime())
        .bind(record.active)
        .bind(record.addon)
        .bind(record.lifetime_access)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to insert membership: {}", e)))?;

        Ok(())
    }

    async fn set_addon_flag(&self, id: &MembershipId) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE memberships SET addon = true WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("failed to set addon flag: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("membership"));
        }
        Ok(())
    }
}
