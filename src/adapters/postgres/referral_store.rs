//! PostgreSQL implementation of ReferralStore.
//!
//! The referral subsystem owns these tables; this adapter only reads
//! referrals, appends commission rows, and writes the completed
//! transition.

use crate::domain::foundation::{CommissionId, ReferralId, StoreError, Timestamp, UserId};
use crate::domain::referral::{
    CommissionDraft, ReferralLinkType, ReferralRecord, ReferralStatus,
};
use crate::ports::ReferralStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the ReferralStore port.
pub struct PostgresReferralStore {
    pool: PgPool,
}

impl PostgresReferralStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReferralRow {
    id: Uuid,
    referrer_id: Uuid,
    referred_id: Uuid,
    link_type: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReferralRow> for ReferralRecord {
    type Error = StoreError;

    fn try_from(row: ReferralRow) -> Result<Self, Self::Error> {
        Ok(ReferralRecord {
            id: ReferralId::from_uuid(row.id),
            referrer_id: UserId::from_uuid(row.referrer_id),
            referred_id: UserId::from_uuid(row.referred_id),
            link_type: parse_link_type(&row.link_type)?,
            status: parse_status(&row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_link_type(s: &str) -> Result<ReferralLinkType, StoreError> {
    match s.to_lowercase().as_str() {
        "plain" => Ok(ReferralLinkType::Plain),
        "dcs" => Ok(ReferralLinkType::Dcs),
        _ => Err(StoreError::database(format!("invalid link type: {}", s))),
    }
}

fn parse_status(s: &str) -> Result<ReferralStatus, StoreError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(ReferralStatus::Pending),
        "completed" => Ok(ReferralStatus::Completed),
        "expired" => Ok(ReferralStatus::Expired),
        _ => Err(StoreError::database(format!("invalid referral status: {}", s))),
    }
}

#[async_trait]
impl ReferralStore for PostgresReferralStore {
    async fn latest_for_referred(
        &self,
        referred_id: &UserId,
    ) -> Result<Option<ReferralRecord>, StoreError> {
        let row: Option<ReferralRow> = sqlx::query_as(
            "SELECT id, referrer_id, referred_id, link_type, status, created_at \
             FROM referrals \
             WHERE referred_id = $1 AND status IN ('pending', 'completed') \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(referred_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to find referral: {}", e)))?;

        row.map(ReferralRecord::try_from).transpose()
    }

    async fn create_commission(
        &self,
        draft: &CommissionDraft,
    ) -> Result<CommissionId, StoreError> {
        let id = CommissionId::new();

        sqlx::query(
            r#"
            INSERT INTO commissions (
                id, affiliate_id, referral_id, payment_id, kind, amount, currency,
                rate, base_amount, base_currency, status, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now())
            "#,
        )
        .bind(id.as_uuid())
        .bind(draft.affiliate_id.as_uuid())
        .bind(draft.referral_id.as_ref().map(|r| *r.as_uuid()))
        .bind(draft.payment_id.as_ref().map(|p| *p.as_uuid()))
        .bind(draft.kind.as_str())
        .bind(draft.amount)
        .bind(&draft.currency)
        .bind(draft.rate)
        .bind(draft.base_amount)
        .bind(&draft.base_currency)
        .bind(draft.status.as_str())
        .bind(&draft.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to insert commission: {}", e)))?;

        Ok(id)
    }

    async fn complete_referral(&self, id: &ReferralId) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE referrals SET status = 'completed' WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("failed to complete referral: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("referral"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_link_type_matches_vocabulary() {
        assert_eq!(parse_link_type("plain").unwrap(), ReferralLinkType::Plain);
        assert_eq!(parse_link_type("dcs").unwrap(), ReferralLinkType::Dcs);
        assert_eq!(parse_link_type("DCS").unwrap(), ReferralLinkType::Dcs);
        assert!(parse_link_type("bonus").is_err());
    }

    #[test]
    fn parse_status_matches_vocabulary() {
        assert_eq!(parse_status("pending").unwrap(), ReferralStatus::Pending);
        assert_eq!(parse_status("completed").unwrap(), ReferralStatus::Completed);
        assert_eq!(parse_status("expired").unwrap(), ReferralStatus::Expired);
        assert!(parse_status("cancelled").is_err());
    }

    #[test]
    fn referral_row_converts() {
        let row = ReferralRow {
            id: Uuid::new_v4(),
            referrer_id: Uuid::new_v4(),
            referred_id: Uuid::new_v4(),
            link_type: "dcs".to_string(),
            status: "pending".to_string(),
            created_at: Utc::now(),
        };
        let record = ReferralRecord::try_from(row).unwrap();
        assert_eq!(record.link_type, ReferralLinkType::Dcs);
        assert!(record.link_type.is_bonus_eligible());
    }
}
