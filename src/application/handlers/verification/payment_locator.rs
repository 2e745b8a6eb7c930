//! Payment locator: maps an inbound `(reference, user)` pair onto a
//! stored payment record, with a trailing-window fallback and, as a
//! last resort, record synthesis from a gateway probe.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use crate::adapters::gateways::GatewayRegistry;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::gateway::VerificationOutcome;
use crate::domain::payment::{PaymentKind, PaymentRecord, PaymentStatus};
use crate::ports::PaymentRepository;

use super::errors::VerificationError;

/// How far back the pending-payment fallback search looks when the
/// reference itself is unknown to the store.
pub const FALLBACK_WINDOW_MINUTES: i64 = 30;

/// What the locator resolved the request to.
#[derive(Debug, Clone)]
pub enum LocatedPayment {
    /// A record the store already knew (exact match or adopted from the
    /// fallback window). Reconciliation still has to run for it.
    Stored(PaymentRecord),

    /// A record synthesized from a successful gateway probe. Already
    /// completed; the probe result is carried so reconciliation never
    /// re-calls the gateway.
    Synthesized {
        record: PaymentRecord,
        outcome: VerificationOutcome,
    },
}

/// Locates or synthesizes the payment record for a verification
/// request.
pub struct PaymentLocator {
    payments: Arc<dyn PaymentRepository>,
    registry: Arc<GatewayRegistry>,
}

impl PaymentLocator {
    pub fn new(payments: Arc<dyn PaymentRepository>, registry: Arc<GatewayRegistry>) -> Self {
        Self { payments, registry }
    }

    /// Three-step locate:
    ///
    /// 1. exact match on the provider reference;
    /// 2. most recent pending payment for the claimed user within the
    ///    trailing window, adopting it by backfilling the reference;
    /// 3. probe every configured gateway in fixed priority order and
    ///    synthesize a completed record from the first success.
    pub async fn locate(
        &self,
        reference: &str,
        user_id: Option<&UserId>,
    ) -> Result<LocatedPayment, VerificationError> {
        if let Some(record) = self.payments.find_by_reference(reference).await? {
            return Ok(LocatedPayment::Stored(record));
        }

        if let Some(user_id) = user_id {
            let window = Duration::minutes(FALLBACK_WINDOW_MINUTES);
            if let Some(mut record) = self
                .payments
                .find_recent_pending_for_user(user_id, window)
                .await?
            {
                info!(
                    payment_id = %record.id,
                    reference,
                    "adopting recent pending payment for unseen reference"
                );
                // Best-effort backfill: the adopted record is usable
                // even if persisting the reference fails.
                if let Err(err) = self
                    .payments
                    .set_provider_reference(&record.id, reference)
                    .await
                {
                    warn!(payment_id = %record.id, error = %err, "reference backfill failed");
                }
                record.provider_reference = Some(reference.to_string());
                return Ok(LocatedPayment::Stored(record));
            }
        }

        self.synthesize(reference, user_id).await
    }

    /// Unseen-payment path: the checkout-initiation step never created
    /// a record, or the request arrived out of order.
    async fn synthesize(
        &self,
        reference: &str,
        user_id: Option<&UserId>,
    ) -> Result<LocatedPayment, VerificationError> {
        let mut probe_success = None;
        for client in self.registry.probe_clients() {
            match client.verify(reference).await {
                Ok(outcome) if outcome.is_success() => {
                    probe_success = Some(outcome);
                    break;
                }
                Ok(outcome) => {
                    info!(
                        provider = %outcome.provider,
                        reference,
                        "probe returned non-success, trying next provider"
                    );
                }
                Err(err) => {
                    warn!(provider = %client.provider(), reference, error = %err, "probe failed");
                }
            }
        }

        let outcome = match probe_success {
            Some(outcome) => outcome,
            None => return Err(VerificationError::PaymentNotFound),
        };

        let package_id = outcome
            .package_hint()
            .ok_or(VerificationError::MissingPackageHint)?;

        let kind = if outcome.addon_hint() {
            PaymentKind::AddonUpgrade
        } else if user_id.is_none() {
            PaymentKind::GuestReferral
        } else {
            PaymentKind::Membership
        };

        let mut record = PaymentRecord::pending(
            user_id.cloned(),
            package_id,
            outcome.amount,
            outcome.currency.clone(),
            outcome.provider,
            kind,
        );
        record.provider_reference = Some(reference.to_string());
        record.metadata = outcome.metadata.clone();
        // The probe already confirmed settlement, so the record is
        // inserted completed rather than replayed through pending.
        record.status = PaymentStatus::Completed;
        record.paid_at = Some(outcome.paid_at.unwrap_or_else(Timestamp::now));

        match self.payments.insert(&record).await {
            Ok(()) => {
                info!(payment_id = %record.id, reference, "synthesized payment from gateway probe");
                Ok(LocatedPayment::Synthesized { record, outcome })
            }
            Err(err) if err.is_duplicate_reference() => {
                // Lost an insert race; the concurrent writer's row wins.
                info!(reference, "synthesis collided, adopting pre-existing record");
                let existing = self
                    .payments
                    .find_by_reference(reference)
                    .await?
                    .ok_or(VerificationError::PaymentNotFound)?;
                Ok(LocatedPayment::Stored(existing))
            }
            Err(err) => Err(err.into()),
        }
    }
}
