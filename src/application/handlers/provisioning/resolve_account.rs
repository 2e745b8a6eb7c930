//! Account resolver for guest checkouts.
//!
//! Runs only when a payment record has no bound user. Resolves or
//! creates the account, binds it to the payment, and issues a
//! passwordless sign-in link. Failures here are hard failures: nothing
//! downstream can be provisioned without a user id.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::domain::foundation::{PackageId, PaymentId, StoreError, UserId};
use crate::ports::{AccountError, AccountService, MagicLinkRequest, PaymentRepository};

/// Command to bind a guest payment to a user account.
#[derive(Debug, Clone)]
pub struct ResolveAccountCommand {
    pub payment_id: PaymentId,
    pub package_id: PackageId,

    /// Payer email as reported by the gateway.
    pub email: String,

    /// Referral metadata to carry through the sign-in link.
    pub referral_metadata: Option<serde_json::Value>,
}

/// Outcome of account resolution.
#[derive(Debug, Clone)]
pub struct ResolveAccountResult {
    pub user_id: UserId,
    pub account_created: bool,
    pub link_sent: bool,
}

/// Errors aborting account resolution.
#[derive(Debug, Error)]
pub enum ResolveAccountError {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Handler binding guest payments to accounts.
pub struct ResolveAccountHandler {
    accounts: Arc<dyn AccountService>,
    payments: Arc<dyn PaymentRepository>,
}

impl ResolveAccountHandler {
    pub fn new(accounts: Arc<dyn AccountService>, payments: Arc<dyn PaymentRepository>) -> Self {
        Self { accounts, payments }
    }

    pub async fn handle(
        &self,
        cmd: ResolveAccountCommand,
    ) -> Result<ResolveAccountResult, ResolveAccountError> {
        let (user_id, account_created) =
            match self.accounts.find_user_by_email(&cmd.email).await? {
                Some(existing) => (existing, false),
                None => {
                    let created = self
                        .accounts
                        .create_account(&cmd.email, &cmd.payment_id)
                        .await?;
                    info!(user_id = %created, payment_id = %cmd.payment_id, "created account for guest payer");
                    (created, true)
                }
            };

        self.payments.bind_user(&cmd.payment_id, &user_id).await?;

        self.accounts
            .send_magic_link(MagicLinkRequest {
                user_id,
                email: cmd.email,
                package_id: cmd.package_id,
                referral_metadata: cmd.referral_metadata,
            })
            .await?;

        Ok(ResolveAccountResult {
            user_id,
            account_created,
            link_sent: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockAccountService {
        known_email: Option<(String, UserId)>,
        fail_link: bool,
        created: Mutex<Vec<String>>,
        links: Mutex<Vec<MagicLinkRequest>>,
    }

    impl MockAccountService {
        fn empty() -> Self {
            Self {
                known_email: None,
                fail_link: false,
                created: Mutex::new(Vec::new()),
                links: Mutex::new(Vec::new()),
            }
        }

        fn knowing(email: &str, user_id: UserId) -> Self {
            let mut svc = Self::empty();
            svc.known_email = Some((email.to_string(), user_id));
            svc
        }
    }

    #[async_trait]
    impl AccountService for MockAccountService {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, AccountError> {
            Ok(self
                .known_email
                .as_ref()
                .filter(|(known, _)| known == email)
                .map(|(_, id)| *id))
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
            if self.fail_link {
                return Err(AccountError::LinkDispatch("smtp down".to_string()));
            }
            self.links.lock().unwrap().push(request);
            Ok(())
        }

        async fn promote_to_affiliate(&self, _user_id: &UserId) -> Result<(), AccountError> {
            Ok(())
        }
    }

    struct MockPaymentRepository {
        bound: Mutex<Vec<(PaymentId, UserId)>>,
    }

    impl MockPaymentRepository {
        fn new() -> Self {
            Self {
                bound: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PaymentRepository for MockPaymentRepository {
        async fn find_by_reference(
            &self,
            _reference: &str,
        ) -> Result<Option<crate::domain::payment::PaymentRecord>, StoreError> {
            Ok(None)
        }

        async fn find_recent_pending_for_user(
            &self,
            _user_id: &UserId,
            _window: chrono::Duration,
        ) -> Result<Option<crate::domain::payment::PaymentRecord>, StoreError> {
            Ok(None)
        }

        async fn set_provider_reference(
            &self,
            _id: &PaymentId,
            _reference: &str,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn insert(
            &self,
            _record: &crate::domain::payment::PaymentRecord,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn mark_completed(
            &self,
            _id: &PaymentId,
            _paid_at: crate::domain::foundation::Timestamp,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn mark_failed(&self, _id: &PaymentId) -> Result<(), StoreError> {
            Ok(())
        }

        async fn bind_user(&self, id: &PaymentId, user_id: &UserId) -> Result<(), StoreError> {
            self.bound.lock().unwrap().push((*id, *user_id));
            Ok(())
        }
    }

    fn command() -> ResolveAccountCommand {
        ResolveAccountCommand {
            payment_id: PaymentId::new(),
            package_id: PackageId::new(),
            email: "payer@example.com".to_string(),
            referral_metadata: None,
        }
    }

    #[tokio::test]
    async fn existing_account_is_reused_not_duplicated() {
        let user = UserId::new();
        let accounts = Arc::new(MockAccountService::knowing("payer@example.com", user));
        let payments = Arc::new(MockPaymentRepository::new());
        let handler = ResolveAccountHandler::new(accounts.clone(), payments.clone());

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result.user_id, user);
        assert!(!result.account_created);
        assert!(result.link_sent);
        assert!(accounts.created.lock().unwrap().is_empty());
        assert_eq!(accounts.links.lock().unwrap().len(), 1);
        assert_eq!(payments.bound.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_email_creates_account_and_binds_payment() {
        let accounts = Arc::new(MockAccountService::empty());
        let payments = Arc::new(MockPaymentRepository::new());
        let handler = ResolveAccountHandler::new(accounts.clone(), payments.clone());

        let cmd = command();
        let payment_id = cmd.payment_id;
        let result = handler.handle(cmd).await.unwrap();

        assert!(result.account_created);
        assert_eq!(
            accounts.created.lock().unwrap().as_slice(),
            ["payer@example.com"]
        );
        let bound = payments.bound.lock().unwrap().clone();
        assert_eq!(bound, vec![(payment_id, result.user_id)]);
    }

    #[tokio::test]
    async fn link_dispatch_failure_is_a_hard_failure() {
        let mut accounts = MockAccountService::empty();
        accounts.fail_link = true;
        let handler =
            ResolveAccountHandler::new(Arc::new(accounts), Arc::new(MockPaymentRepository::new()));

        let err = handler.handle(command()).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveAccountError::Account(AccountError::LinkDispatch(_))
        ));
    }

    #[tokio::test]
    async fn link_carries_package_and_referral_metadata() {
        let accounts = Arc::new(MockAccountService::empty());
        let handler =
            ResolveAccountHandler::new(accounts.clone(), Arc::new(MockPaymentRepository::new()));

        let mut cmd = command();
        cmd.referral_metadata = Some(serde_json::json!({ "ref": "dcs" }));
        let package_id = cmd.package_id;
        handler.handle(cmd).await.unwrap();

        let links = accounts.links.lock().unwrap();
        assert_eq!(links[0].package_id, package_id);
        assert_eq!(
            links[0].referral_metadata,
            Some(serde_json::json!({ "ref": "dcs" }))
        );
    }
}
