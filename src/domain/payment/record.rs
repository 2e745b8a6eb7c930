//! The payment record and its status state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PackageId, PaymentId, Timestamp, UserId};
use crate::domain::gateway::GatewayProvider;

use super::errors::PaymentError;

/// Lifecycle of a payment. Transitions are one-directional:
/// `Pending -> Completed` or `Pending -> Failed`; both end states are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// What the payment buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Standard membership purchase.
    Membership,
    /// Extends an existing active membership with the addon capability.
    AddonUpgrade,
    /// Guest checkout through a referral link; no account bound yet.
    GuestReferral,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Membership => "membership",
            PaymentKind::AddonUpgrade => "addon_upgrade",
            PaymentKind::GuestReferral => "guest_referral",
        }
    }
}

/// Root aggregate of a verification request.
///
/// Created at checkout initiation, or synthesized by the payment locator
/// when a successful gateway transaction has no matching record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,

    /// Owning user; `None` until a guest checkout is resolved to an
    /// account.
    pub user_id: Option<UserId>,

    /// Membership package this payment is for.
    pub package_id: PackageId,

    /// Amount in major currency units.
    pub amount: f64,

    pub currency: String,

    pub status: PaymentStatus,

    /// Gateway the payment was initiated on.
    pub provider: GatewayProvider,

    /// External transaction id; unique when present.
    pub provider_reference: Option<String>,

    pub kind: PaymentKind,

    /// Free-form metadata captured at checkout (addon flags, referral
    /// hints). Takes precedence over gateway-supplied metadata.
    pub metadata: serde_json::Value,

    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    /// Creates a pending payment as the checkout-initiation step would.
    pub fn pending(
        user_id: Option<UserId>,
        package_id: PackageId,
        amount: f64,
        currency: impl Into<String>,
        provider: GatewayProvider,
        kind: PaymentKind,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentId::new(),
            user_id,
            package_id,
            amount,
            currency: currency.into(),
            status: PaymentStatus::Pending,
            provider,
            provider_reference: None,
            kind,
            metadata: serde_json::Value::Null,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transitions `Pending -> Completed`.
    pub fn complete(&mut self, paid_at: Timestamp) -> Result<(), PaymentError> {
        self.transition_from_pending(PaymentStatus::Completed)?;
        self.paid_at = Some(paid_at);
        Ok(())
    }

    /// Transitions `Pending -> Failed`.
    pub fn fail(&mut self) -> Result<(), PaymentError> {
        self.transition_from_pending(PaymentStatus::Failed)
    }

    fn transition_from_pending(&mut self, to: PaymentStatus) -> Result<(), PaymentError> {
        if self.status != PaymentStatus::Pending {
            return Err(PaymentError::invalid_transition(self.status, to));
        }
        self.status = to;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Whether this payment is an addon upgrade, from the explicit kind
    /// or the record's own metadata flag.
    pub fn is_addon_upgrade(&self) -> bool {
        if self.kind == PaymentKind::AddonUpgrade {
            return true;
        }
        self.metadata
            .get("addon")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Whether the record itself carries an addon metadata flag (set at
    /// checkout). Used to give record metadata precedence over gateway
    /// metadata, which is not guaranteed to survive the round trip.
    pub fn has_addon_metadata(&self) -> bool {
        self.metadata.get("addon").is_some() || self.kind == PaymentKind::AddonUpgrade
    }
}
