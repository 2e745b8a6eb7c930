//! Verify-payment orchestrator.
//!
//! Drives one verification request end to end: locate the record,
//! reconcile it against the gateway, then fan out the consequences of
//! settlement. The idempotent short-circuit on an already-completed
//! record is the load-bearing property here: it issues zero gateway
//! calls and zero further side effects, so redirect-back refreshes and
//! client retries cannot double-provision.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::adapters::gateways::GatewayRegistry;
use crate::application::handlers::commissions::{
    AttributeCommissionsCommand, AttributeCommissionsHandler, CommissionPolicy,
};
use crate::application::handlers::provisioning::{
    ProvisionMembershipCommand, ProvisionMembershipHandler, ResolveAccountCommand,
    ResolveAccountHandler,
};
use crate::domain::foundation::{PackageId, PaymentId, Timestamp, UserId};
use crate::domain::gateway::VerificationOutcome;
use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::ports::{
    AccountService, MembershipStore, Notification, Notifier, PaymentRepository, ReferralStore,
};

use super::errors::VerificationError;
use super::payment_locator::{LocatedPayment, PaymentLocator};

/// Command carried by one inbound verification request.
#[derive(Debug, Clone)]
pub struct VerifyPaymentCommand {
    /// External gateway transaction reference.
    pub reference: String,

    /// Claimed owner, absent for guest checkouts.
    pub user_id: Option<UserId>,
}

/// Definitive verdict about the payment. Downstream provisioning
/// outcomes never change the verdict; only the flags report them.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyPaymentResult {
    pub success: bool,
    pub message: String,

    /// True when the record was already completed and the request
    /// short-circuited without touching the gateway.
    pub already_verified: bool,

    pub payment_id: PaymentId,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub package_id: PackageId,

    /// Guest-checkout flags.
    pub account_created: bool,
    pub signin_link_sent: bool,
}

impl VerifyPaymentResult {
    fn from_record(record: &PaymentRecord, success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            already_verified: false,
            payment_id: record.id,
            amount: record.amount,
            currency: record.currency.clone(),
            status: record.status,
            package_id: record.package_id,
            account_created: false,
            signin_link_sent: false,
        }
    }
}

/// Handler for the verify-payment flow.
pub struct VerifyPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    registry: Arc<GatewayRegistry>,
    locator: PaymentLocator,
    resolver: ResolveAccountHandler,
    provisioner: ProvisionMembershipHandler,
    commissions: AttributeCommissionsHandler,
    notifier: Arc<dyn Notifier>,
}

impl VerifyPaymentHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        registry: Arc<GatewayRegistry>,
        memberships: Arc<dyn MembershipStore>,
        referrals: Arc<dyn ReferralStore>,
        accounts: Arc<dyn AccountService>,
        notifier: Arc<dyn Notifier>,
        policy: CommissionPolicy,
    ) -> Self {
        Self {
            locator: PaymentLocator::new(Arc::clone(&payments), Arc::clone(&registry)),
            resolver: ResolveAccountHandler::new(Arc::clone(&accounts), Arc::clone(&payments)),
            provisioner: ProvisionMembershipHandler::new(
                Arc::clone(&memberships),
                Arc::clone(&accounts),
            ),
            commissions: AttributeCommissionsHandler::new(
                referrals,
                memberships,
                Arc::clone(&notifier),
                policy,
            ),
            payments,
            registry,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: VerifyPaymentCommand,
    ) -> Result<VerifyPaymentResult, VerificationError> {
        let reference = cmd.reference.trim();
        if reference.is_empty() {
            return Err(VerificationError::MissingReference);
        }

        match self.locator.locate(reference, cmd.user_id.as_ref()).await? {
            LocatedPayment::Stored(record) => match record.status {
                PaymentStatus::Completed => {
                    info!(payment_id = %record.id, reference, "payment already verified");
                    let mut result =
                        VerifyPaymentResult::from_record(&record, true, "payment already verified");
                    result.already_verified = true;
                    Ok(result)
                }
                PaymentStatus::Failed => Ok(VerifyPaymentResult::from_record(
                    &record,
                    false,
                    "payment previously failed; a new checkout is required",
                )),
                PaymentStatus::Pending => self.reconcile(record, reference).await,
            },
            LocatedPayment::Synthesized { record, outcome } => {
                // The probe already confirmed settlement; go straight
                // to provisioning.
                self.settle(record, outcome).await
            }
        }
    }

    /// Runs the pending-record state machine: exactly one gateway call,
    /// then the persisted transition.
    async fn reconcile(
        &self,
        mut record: PaymentRecord,
        reference: &str,
    ) -> Result<VerifyPaymentResult, VerificationError> {
        let client = self.registry.resolve(record.provider)?;

        let outcome = match client.verify(reference).await {
            Ok(outcome) => outcome,
            Err(err) => {
                // Transport and shape failures count as verification
                // failures for the payment, not server errors.
                warn!(payment_id = %record.id, provider = %record.provider, error = %err, "gateway verification failed");
                record.fail()?;
                self.payments.mark_failed(&record.id).await?;
                return Ok(VerifyPaymentResult::from_record(
                    &record,
                    false,
                    "payment could not be verified with the gateway",
                ));
            }
        };

        if !outcome.is_success() {
            info!(payment_id = %record.id, status = ?outcome.status, "gateway reported non-success");
            record.fail()?;
            self.payments.mark_failed(&record.id).await?;
            return Ok(VerifyPaymentResult::from_record(
                &record,
                false,
                "payment was not successful",
            ));
        }

        let paid_at = outcome.paid_at.unwrap_or_else(Timestamp::now);
        record.complete(paid_at)?;
        self.payments.mark_completed(&record.id, paid_at).await?;
        info!(payment_id = %record.id, reference, "payment completed");

        self.settle(record, outcome).await
    }

    /// Post-completion fan-out: account resolution (hard failure),
    /// membership provisioning and commission attribution (logged,
    /// non-fatal), receipt notification (fire and forget).
    async fn settle(
        &self,
        mut record: PaymentRecord,
        outcome: VerificationOutcome,
    ) -> Result<VerifyPaymentResult, VerificationError> {
        let mut account_created = false;
        let mut signin_link_sent = false;

        let user_id = match record.user_id {
            Some(user_id) => user_id,
            None => {
                let email = outcome.customer_email.clone().ok_or_else(|| {
                    VerificationError::Account(crate::ports::AccountError::Rejected(
                        "gateway reported no payer email for guest checkout".to_string(),
                    ))
                })?;
                let referral_metadata =
                    Some(outcome.metadata.clone()).filter(|m| !m.is_null());
                let resolved = self
                    .resolver
                    .handle(ResolveAccountCommand {
                        payment_id: record.id,
                        package_id: record.package_id,
                        email,
                        referral_metadata,
                    })
                    .await?;
                account_created = resolved.account_created;
                signin_link_sent = resolved.link_sent;
                record.user_id = Some(resolved.user_id);
                resolved.user_id
            }
        };

        let gateway_addon_hint = outcome.addon_hint();
        if let Err(err) = self
            .provisioner
            .handle(ProvisionMembershipCommand {
                payment: record.clone(),
                user_id,
                gateway_addon_hint,
            })
            .await
        {
            // The settlement stands; provisioning gaps are repaired out
            // of band.
            error!(payment_id = %record.id, user_id = %user_id, error = %err, "membership provisioning failed");
        }

        if let Err(err) = self
            .commissions
            .handle(AttributeCommissionsCommand {
                user_id,
                payment: record.clone(),
            })
            .await
        {
            error!(payment_id = %record.id, user_id = %user_id, error = %err, "commission attribution failed");
        }

        self.notifier.notify(Notification::PaymentCompleted {
            payment_id: record.id,
            user_id,
            amount: record.amount,
            currency: record.currency.clone(),
        });

        let mut result =
            VerifyPaymentResult::from_record(&record, true, "payment verified successfully");
        result.account_created = account_created;
        result.signin_link_sent = signin_link_sent;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{
        CommissionId, MembershipId, ReferralId, StoreError,
    };
    use crate::domain::gateway::{GatewayProvider, GatewayTxStatus};
    use crate::domain::membership::{MemberType, MembershipPackage, MembershipRecord};
    use crate::domain::payment::PaymentKind;
    use crate::domain::referral::{
        CommissionDraft, ReferralLinkType, ReferralRecord, ReferralStatus,
    };
    use crate::ports::{
        AccountError, GatewayClient, GatewayError, MagicLinkRequest,
    };
    use async_trait::async_trait;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    // ─── mocks ──────────────────────────────────────────────────────

    struct MockPaymentRepository {
        payments: Mutex<Vec<PaymentRecord>>,
    }

    impl MockPaymentRepository {
        fn with_payment(record: PaymentRecord) -> Self {
            Self {
                payments: Mutex::new(vec![record]),
            }
        }

        fn empty() -> Self {
            Self {
                payments: Mutex::new(Vec::new()),
            }
        }

        fn stored(&self) -> Vec<PaymentRecord> {
            self.payments.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentRepository for MockPaymentRepository {
        async fn find_by_reference(
            &self,
            reference: &str,
        ) -> Result<Option<PaymentRecord>, StoreError> {
            Ok(self
                .payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.provider_reference.as_deref() == Some(reference))
                .cloned())
        }

        async fn find_recent_pending_for_user(
            &self,
            user_id: &UserId,
            window: Duration,
        ) -> Result<Option<PaymentRecord>, StoreError> {
            let cutoff = Timestamp::now().minus_minutes(window.num_minutes());
            Ok(self
                .payments
                .lock()
                .unwrap()
                .iter()
                .filter(|p| {
                    p.user_id.as_ref() == Some(user_id)
                        && p.status == PaymentStatus::Pending
                        && p.created_at.is_after(&cutoff)
                })
                .max_by_key(|p| *p.created_at.as_datetime())
                .cloned())
        }

        async fn set_provider_reference(
            &self,
            id: &PaymentId,
            reference: &str,
        ) -> Result<(), StoreError> {
            let mut payments = self.payments.lock().unwrap();
            if let Some(p) = payments.iter_mut().find(|p| &p.id == id) {
                p.provider_reference = Some(reference.to_string());
            }
            Ok(())
        }

        async fn insert(&self, record: &PaymentRecord) -> Result<(), StoreError> {
            let mut payments = self.payments.lock().unwrap();
            if payments
                .iter()
                .any(|p| p.provider_reference == record.provider_reference)
            {
                let reference = record.provider_reference.clone().unwrap_or_default();
                return Err(StoreError::duplicate_reference(reference));
            }
            payments.push(record.clone());
            Ok(())
        }

        async fn mark_completed(
            &self,
            id: &PaymentId,
            paid_at: Timestamp,
        ) -> Result<(), StoreError> {
            let mut payments = self.payments.lock().unwrap();
            let p = payments
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or(StoreError::not_found("payment"))?;
            p.status = PaymentStatus::Completed;
            p.paid_at = Some(paid_at);
            Ok(())
        }

        async fn mark_failed(&self, id: &PaymentId) -> Result<(), StoreError> {
            let mut payments = self.payments.lock().unwrap();
            let p = payments
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or(StoreError::not_found("payment"))?;
            p.status = PaymentStatus::Failed;
            Ok(())
        }

        async fn bind_user(&self, id: &PaymentId, user_id: &UserId) -> Result<(), StoreError> {
            let mut payments = self.payments.lock().unwrap();
            if let Some(p) = payments.iter_mut().find(|p| &p.id == id) {
                p.user_id = Some(*user_id);
            }
            Ok(())
        }
    }

    struct CountingGateway {
        provider: GatewayProvider,
        outcome: Result<VerificationOutcome, GatewayError>,
        calls: AtomicU32,
    }

    impl CountingGateway {
        fn returning(provider: GatewayProvider, outcome: VerificationOutcome) -> Self {
            Self {
                provider,
                outcome: Ok(outcome),
                calls: AtomicU32::new(0),
            }
        }

        fn failing(provider: GatewayProvider) -> Self {
            Self {
                provider,
                outcome: Err(GatewayError::Transport("connection refused".to_string())),
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GatewayClient for CountingGateway {
        fn provider(&self) -> GatewayProvider {
            self.provider
        }

        async fn verify(&self, reference: &str) -> Result<VerificationOutcome, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok(outcome) => {
                    let mut outcome = outcome.clone();
                    outcome.reference = reference.to_string();
                    Ok(outcome)
                }
                Err(err) => Err(err.clone()),
            }
        }
    }

    struct MockMembershipStore {
        packages: Vec<MembershipPackage>,
        active: Mutex<Vec<MembershipRecord>>,
        inserted: Mutex<Vec<MembershipRecord>>,
        addon_flags: Mutex<Vec<MembershipId>>,
    }

    impl MockMembershipStore {
        fn with_package(package: MembershipPackage) -> Self {
            Self {
                packages: vec![package],
                active: Mutex::new(Vec::new()),
                inserted: Mutex::new(Vec::new()),
                addon_flags: Mutex::new(Vec::new()),
            }
        }

        fn membership_rows(&self) -> usize {
            self.inserted.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MembershipStore for MockMembershipStore {
        async fn find_package(
            &self,
            id: &PackageId,
        ) -> Result<Option<MembershipPackage>, StoreError> {
            Ok(self.packages.iter().find(|p| &p.id == id).cloned())
        }

        async fn find_active_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<MembershipRecord>, StoreError> {
            Ok(self
                .active
                .lock()
                .unwrap()
                .iter()
                .find(|m| &m.user_id == user_id && m.active)
                .cloned())
        }

        async fn insert(&self, record: &MembershipRecord) -> Result<(), StoreError> {
            self.inserted.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn set_addon_flag(&self, id: &MembershipId) -> Result<(), StoreError> {
            self.addon_flags.lock().unwrap().push(*id);
            Ok(())
        }
    }

    struct MockReferralStore {
        referral: Option<ReferralRecord>,
        commissions: Mutex<Vec<CommissionDraft>>,
        completed: Mutex<Vec<ReferralId>>,
    }

    impl MockReferralStore {
        fn empty() -> Self {
            Self {
                referral: None,
                commissions: Mutex::new(Vec::new()),
                completed: Mutex::new(Vec::new()),
            }
        }

        fn with_referral(referral: ReferralRecord) -> Self {
            let mut store = Self::empty();
            store.referral = Some(referral);
            store
        }

        fn commission_rows(&self) -> usize {
            self.commissions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReferralStore for MockReferralStore {
        async fn latest_for_referred(
            &self,
            referred_id: &UserId,
        ) -> Result<Option<ReferralRecord>, StoreError> {
            Ok(self
                .referral
                .clone()
                .filter(|r| &r.referred_id == referred_id))
        }

        async fn create_commission(
            &self,
            draft: &CommissionDraft,
        ) -> Result<CommissionId, StoreError> {
            self.commissions.lock().unwrap().push(draft.clone());
            Ok(CommissionId::new())
        }

        async fn complete_referral(&self, id: &ReferralId) -> Result<(), StoreError> {
            self.completed.lock().unwrap().push(*id);
            Ok(())
        }
    }

    struct MockAccountService {
        created: Mutex<Vec<String>>,
        links: Mutex<Vec<MagicLinkRequest>>,
        promoted: Mutex<Vec<UserId>>,
    }

    impl MockAccountService {
        fn new() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                links: Mutex::new(Vec::new()),
                promoted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AccountService for MockAccountService {
        async fn find_user_by_email(&self, _email: &str) -> Result<Option<UserId>, AccountError> {
            Ok(None)
        }

        async fn create_account(
            &self,
            email: &str,
            _payment_id: &PaymentId,
        ) -> Result<UserId, AccountError> {
            self.created.lock().unwrap().push(email.to_string());
            Ok(UserId::new())
        }

        async fn send_magic_link(&self, request: MagicLinkRequest) -> Result<(), AccountError> {
            self.links.lock().unwrap().push(request);
            Ok(())
        }

        async fn promote_to_affiliate(&self, user_id: &UserId) -> Result<(), AccountError> {
            self.promoted.lock().unwrap().push(*user_id);
            Ok(())
        }
    }

    struct CapturingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    impl CapturingNotifier {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Notifier for CapturingNotifier {
        fn notify(&self, notification: Notification) {
            self.sent.lock().unwrap().push(notification);
        }
    }

    // ─── fixtures ───────────────────────────────────────────────────

    struct Fixture {
        payments: Arc<MockPaymentRepository>,
        gateway: Arc<CountingGateway>,
        memberships: Arc<MockMembershipStore>,
        referrals: Arc<MockReferralStore>,
        accounts: Arc<MockAccountService>,
        notifier: Arc<CapturingNotifier>,
        handler: VerifyPaymentHandler,
    }

    fn fixture(
        payments: MockPaymentRepository,
        gateway: CountingGateway,
        memberships: MockMembershipStore,
        referrals: MockReferralStore,
    ) -> Fixture {
        let payments = Arc::new(payments);
        let gateway = Arc::new(gateway);
        let memberships = Arc::new(memberships);
        let referrals = Arc::new(referrals);
        let accounts = Arc::new(MockAccountService::new());
        let notifier = Arc::new(CapturingNotifier::new());
        let registry = Arc::new(GatewayRegistry::new().with_client(gateway.clone()));

        let handler = VerifyPaymentHandler::new(
            payments.clone(),
            registry,
            memberships.clone(),
            referrals.clone(),
            accounts.clone(),
            notifier.clone(),
            CommissionPolicy::default(),
        );

        Fixture {
            payments,
            gateway,
            memberships,
            referrals,
            accounts,
            notifier,
            handler,
        }
    }

    fn learner_package() -> MembershipPackage {
        MembershipPackage {
            id: PackageId::new(),
            name: "Learner Standard".to_string(),
            member_type: MemberType::Learner,
            duration_months: 6,
            referral_rate: 0.2,
        }
    }

    fn pending_payment(user_id: Option<UserId>, package_id: PackageId, reference: &str) -> PaymentRecord {
        let mut record = PaymentRecord::pending(
            user_id,
            package_id,
            150.0,
            "NGN",
            GatewayProvider::Paystack,
            PaymentKind::Membership,
        );
        record.provider_reference = Some(reference.to_string());
        record
    }

    fn success_outcome() -> VerificationOutcome {
        VerificationOutcome {
            provider: GatewayProvider::Paystack,
            ok: true,
            status: GatewayTxStatus::Success,
            amount: 150.0,
            currency: "NGN".to_string(),
            paid_at: Some(Timestamp::now()),
            reference: String::new(),
            customer_email: Some("payer@example.com".to_string()),
            metadata: json!({}),
        }
    }

    fn declined_outcome() -> VerificationOutcome {
        let mut outcome = success_outcome();
        outcome.status = GatewayTxStatus::Failed;
        outcome
    }

    fn command(reference: &str, user_id: Option<UserId>) -> VerifyPaymentCommand {
        VerifyPaymentCommand {
            reference: reference.to_string(),
            user_id,
        }
    }

    // ─── tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn missing_reference_is_rejected_without_side_effects() {
        let f = fixture(
            MockPaymentRepository::empty(),
            CountingGateway::returning(GatewayProvider::Paystack, success_outcome()),
            MockMembershipStore::with_package(learner_package()),
            MockReferralStore::empty(),
        );

        let err = f.handler.handle(command("   ", None)).await.unwrap_err();
        assert!(matches!(err, VerificationError::MissingReference));
        assert_eq!(f.gateway.call_count(), 0);
        assert!(f.payments.stored().is_empty());
    }

    #[tokio::test]
    async fn successful_verification_completes_and_provisions() {
        let user = UserId::new();
        let package = learner_package();
        let f = fixture(
            MockPaymentRepository::with_payment(pending_payment(Some(user), package.id, "tx_1")),
            CountingGateway::returning(GatewayProvider::Paystack, success_outcome()),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let result = f.handler.handle(command("tx_1", Some(user))).await.unwrap();

        assert!(result.success);
        assert!(!result.already_verified);
        assert_eq!(result.status, PaymentStatus::Completed);
        assert_eq!(f.gateway.call_count(), 1);
        assert_eq!(f.payments.stored()[0].status, PaymentStatus::Completed);
        assert_eq!(f.memberships.membership_rows(), 1);
        assert_eq!(f.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reverification_is_idempotent_with_zero_gateway_calls() {
        let user = UserId::new();
        let package = learner_package();
        let f = fixture(
            MockPaymentRepository::with_payment(pending_payment(Some(user), package.id, "tx_1")),
            CountingGateway::returning(GatewayProvider::Paystack, success_outcome()),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let first = f.handler.handle(command("tx_1", Some(user))).await.unwrap();
        assert!(first.success);
        let calls_after_first = f.gateway.call_count();
        let rows_after_first = f.memberships.membership_rows();

        let second = f.handler.handle(command("tx_1", Some(user))).await.unwrap();

        assert!(second.success);
        assert!(second.already_verified);
        assert_eq!(second.payment_id, first.payment_id);
        assert_eq!(second.amount, first.amount);
        assert_eq!(second.status, first.status);
        // Zero additional gateway calls, membership rows, commissions.
        assert_eq!(f.gateway.call_count(), calls_after_first);
        assert_eq!(f.memberships.membership_rows(), rows_after_first);
        assert_eq!(f.referrals.commission_rows(), 0);
    }

    #[tokio::test]
    async fn declined_payment_fails_without_provisioning() {
        let user = UserId::new();
        let package = learner_package();
        let f = fixture(
            MockPaymentRepository::with_payment(pending_payment(Some(user), package.id, "tx_1")),
            CountingGateway::returning(GatewayProvider::Paystack, declined_outcome()),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let result = f.handler.handle(command("tx_1", Some(user))).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.status, PaymentStatus::Failed);
        assert_eq!(f.payments.stored()[0].status, PaymentStatus::Failed);
        assert_eq!(f.memberships.membership_rows(), 0);
        assert_eq!(f.referrals.commission_rows(), 0);
        assert!(f.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_transport_error_marks_payment_failed() {
        let user = UserId::new();
        let package = learner_package();
        let f = fixture(
            MockPaymentRepository::with_payment(pending_payment(Some(user), package.id, "tx_1")),
            CountingGateway::failing(GatewayProvider::Paystack),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let result = f.handler.handle(command("tx_1", Some(user))).await.unwrap();

        assert!(!result.success);
        assert_eq!(f.payments.stored()[0].status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn failed_payment_stays_failed_on_reverification() {
        let user = UserId::new();
        let package = learner_package();
        let mut record = pending_payment(Some(user), package.id, "tx_1");
        record.fail().unwrap();
        let f = fixture(
            MockPaymentRepository::with_payment(record),
            CountingGateway::returning(GatewayProvider::Paystack, success_outcome()),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let result = f.handler.handle(command("tx_1", Some(user))).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.status, PaymentStatus::Failed);
        // Terminal: no gateway call is made for a failed record.
        assert_eq!(f.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn unconfigured_provider_fails_closed() {
        let user = UserId::new();
        let package = learner_package();
        let mut record = pending_payment(Some(user), package.id, "tx_1");
        record.provider = GatewayProvider::Flutterwave;
        let f = fixture(
            MockPaymentRepository::with_payment(record),
            CountingGateway::returning(GatewayProvider::Paystack, success_outcome()),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let err = f.handler.handle(command("tx_1", Some(user))).await.unwrap_err();
        assert!(matches!(
            err,
            VerificationError::GatewayNotConfigured(GatewayProvider::Flutterwave)
        ));
    }

    #[tokio::test]
    async fn guest_payment_resolves_account_and_sends_link() {
        let package = learner_package();
        let f = fixture(
            MockPaymentRepository::with_payment(pending_payment(None, package.id, "tx_guest")),
            CountingGateway::returning(GatewayProvider::Paystack, success_outcome()),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let result = f.handler.handle(command("tx_guest", None)).await.unwrap();

        assert!(result.success);
        assert!(result.account_created);
        assert!(result.signin_link_sent);
        assert_eq!(
            f.accounts.created.lock().unwrap().as_slice(),
            ["payer@example.com"]
        );
        assert_eq!(f.accounts.links.lock().unwrap().len(), 1);
        // The resolved user is bound onto the stored payment.
        assert!(f.payments.stored()[0].user_id.is_some());
        assert_eq!(f.memberships.membership_rows(), 1);
    }

    #[tokio::test]
    async fn guest_payment_without_payer_email_is_a_hard_failure() {
        let package = learner_package();
        let mut outcome = success_outcome();
        outcome.customer_email = None;
        let f = fixture(
            MockPaymentRepository::with_payment(pending_payment(None, package.id, "tx_guest")),
            CountingGateway::returning(GatewayProvider::Paystack, outcome),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let err = f.handler.handle(command("tx_guest", None)).await.unwrap_err();
        assert!(matches!(err, VerificationError::Account(_)));
        // The payment itself is still settled.
        assert_eq!(f.payments.stored()[0].status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn referred_purchase_attributes_commissions() {
        let user = UserId::new();
        let package = learner_package();
        let referral = ReferralRecord {
            id: ReferralId::new(),
            referrer_id: UserId::new(),
            referred_id: user,
            link_type: ReferralLinkType::Dcs,
            status: ReferralStatus::Pending,
            created_at: Timestamp::now(),
        };
        let f = fixture(
            MockPaymentRepository::with_payment(pending_payment(Some(user), package.id, "tx_1")),
            CountingGateway::returning(GatewayProvider::Paystack, success_outcome()),
            MockMembershipStore::with_package(package),
            MockReferralStore::with_referral(referral.clone()),
        );

        let result = f.handler.handle(command("tx_1", Some(user))).await.unwrap();

        assert!(result.success);
        // DCS link + learner package: base + addon bonus.
        assert_eq!(f.referrals.commission_rows(), 2);
        assert_eq!(
            f.referrals.completed.lock().unwrap().as_slice(),
            [referral.id]
        );
        // One receipt + two commission notifications.
        assert_eq!(f.notifier.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn adopted_pending_payment_is_reconciled() {
        let user = UserId::new();
        let package = learner_package();
        // Pending payment with no reference; inbound carries a fresh one.
        let mut record = pending_payment(Some(user), package.id, "ignored");
        record.provider_reference = None;
        let f = fixture(
            MockPaymentRepository::with_payment(record.clone()),
            CountingGateway::returning(GatewayProvider::Paystack, success_outcome()),
            MockMembershipStore::with_package(package),
            MockReferralStore::empty(),
        );

        let result = f.handler.handle(command("tx_fresh", Some(user))).await.unwrap();

        assert!(result.success);
        assert_eq!(result.payment_id, record.id);
        let stored = f.payments.stored();
        assert_eq!(stored[0].provider_reference.as_deref(), Some("tx_fresh"));
        assert_eq!(stored[0].status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn unseen_reference_synthesizes_from_probe() {
        let package = learner_package();
        let mut outcome = success_outcome();
        outcome.metadata = json!({ "package_id": package.id.to_string() });
        let f = fixture(
            MockPaymentRepository::empty(),
            CountingGateway::returning(GatewayProvider::Paystack, outcome),
            MockMembershipStore::with_package(package.clone()),
            MockReferralStore::empty(),
        );

        let result = f.handler.handle(command("tx_unseen", None)).await.unwrap();

        assert!(result.success);
        assert_eq!(result.package_id, package.id);
        assert!(result.account_created);
        let stored = f.payments.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, PaymentStatus::Completed);
        assert_eq!(f.memberships.membership_rows(), 1);
    }
}
