//! Transaction execution pipeline.
//!
//! The executor takes a built operation through freeze → sign → submit and
//! blocks until the gateway returns a terminal receipt. It owns no state
//! and decides no policy: which operation to run and what its success
//! means belong to the workflow layer.
//!
//! Signer resolution happens before freezing, so an unresolvable role
//! fails the step without anything ever reaching the network.

#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use issuance_gateway::{GatewayError, LedgerGateway};
use issuance_identity::{IdentityError, SignerRegistry};
use issuance_operation::OperationRequest;
use issuance_types::{
    AccountBalance, AccountId, KeyRole, NetworkContext, Receipt, ReceiptStatus, TokenId, TokenInfo,
};
use thiserror::Error;
use tokio::time::timeout;

/// Default bound on waiting for a terminal receipt or query response.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from one execution attempt.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// A mandated signer role has no registered identity.
    #[error("required signer for role {0} is not registered")]
    MissingSigner(KeyRole),

    /// Signing failed after the role resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The ledger answered with a non-success status, carried verbatim.
    #[error("ledger rejected {kind}: {status}")]
    LedgerRejection {
        kind: &'static str,
        status: ReceiptStatus,
    },

    /// No terminal receipt within the allotted bound. The outcome is
    /// ambiguous: the operation may or may not have applied, so this is
    /// deliberately distinct from a rejection.
    #[error("no terminal receipt within {0:?}; outcome unknown")]
    ConfirmationTimeout(Duration),

    /// Transport-level gateway failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Freezes, signs, submits, and confirms operations against one gateway.
pub struct TransactionExecutor<G> {
    gateway: Arc<G>,
    registry: Arc<SignerRegistry>,
    confirmation_timeout: Duration,
}

impl<G: LedgerGateway> TransactionExecutor<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<SignerRegistry>) -> Self {
        Self {
            gateway,
            registry,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_confirmation_timeout(mut self, bound: Duration) -> Self {
        self.confirmation_timeout = bound;
        self
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn registry(&self) -> &Arc<SignerRegistry> {
        &self.registry
    }

    /// Run one operation to its terminal receipt.
    ///
    /// Freezing binds the request to `ctx` and must precede signing; the
    /// required signatures are applied in the order the kind mandates.
    /// A non-success receipt becomes [`ExecutorError::LedgerRejection`].
    pub async fn execute(
        &self,
        request: OperationRequest,
        ctx: &NetworkContext,
    ) -> Result<Receipt, ExecutorError> {
        let kind = request.kind();
        let signers = request.required_signers();
        for role in &signers {
            if !self.registry.contains(role) {
                return Err(ExecutorError::MissingSigner(role.clone()));
            }
        }

        let frozen = request.freeze(ctx);
        let digest = frozen.signing_digest();
        let transaction_id = frozen.transaction_id.clone();
        let mut signed = frozen.into_signed();
        for role in signers {
            signed.attach(self.registry.sign_as(&role, &digest)?);
        }

        tracing::debug!(kind, transaction_id = %transaction_id, "submitting operation");
        let started = Instant::now();
        let receipt = timeout(self.confirmation_timeout, self.gateway.submit(signed))
            .await
            .map_err(|_| ExecutorError::ConfirmationTimeout(self.confirmation_timeout))??;
        let elapsed = started.elapsed();

        tracing::info!(
            kind,
            transaction_id = %receipt.transaction_id,
            status = %receipt.status,
            elapsed_ms = elapsed.as_millis() as u64,
            "operation confirmed"
        );

        if !receipt.is_success() {
            return Err(ExecutorError::LedgerRejection {
                kind,
                status: receipt.status,
            });
        }
        Ok(receipt)
    }

    /// Total supply of a token, bounded by the confirmation timeout.
    pub async fn token_supply(&self, token: &TokenId) -> Result<u64, ExecutorError> {
        Ok(self.token_info(token).await?.total_supply)
    }

    /// Registered token state, bounded by the confirmation timeout.
    pub async fn token_info(&self, token: &TokenId) -> Result<TokenInfo, ExecutorError> {
        let info = timeout(self.confirmation_timeout, self.gateway.token_info(token))
            .await
            .map_err(|_| ExecutorError::ConfirmationTimeout(self.confirmation_timeout))??;
        Ok(info)
    }

    /// Account holdings, bounded by the confirmation timeout.
    pub async fn account_balance(
        &self,
        account: &AccountId,
    ) -> Result<AccountBalance, ExecutorError> {
        let balance = timeout(
            self.confirmation_timeout,
            self.gateway.account_balance(account),
        )
        .await
        .map_err(|_| ExecutorError::ConfirmationTimeout(self.confirmation_timeout))??;
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use issuance_gateway::InMemoryLedger;
    use issuance_identity::Identity;
    use issuance_operation::{SignedOperation, TokenAssociateBuilder, TokenCreateBuilder};

    fn registry_with(roles: &[KeyRole]) -> Arc<SignerRegistry> {
        let registry = SignerRegistry::new();
        for role in roles {
            registry.register(Identity::generate(role.clone())).unwrap();
        }
        Arc::new(registry)
    }

    fn seeded_ledger(registry: &SignerRegistry) -> (Arc<InMemoryLedger>, NetworkContext, AccountId)
    {
        let ledger = InMemoryLedger::new();
        let operator = ledger
            .register_account(
                registry.public_key(&KeyRole::Operator).unwrap(),
                10_000,
            )
            .unwrap();
        let treasury = ledger
            .register_account(
                registry.public_key(&KeyRole::Treasury).unwrap(),
                10_000,
            )
            .unwrap();
        (
            Arc::new(ledger),
            NetworkContext::new("local", operator),
            treasury,
        )
    }

    #[tokio::test]
    async fn executes_a_signed_operation_to_receipt() {
        let registry = registry_with(&[KeyRole::Operator, KeyRole::Treasury]);
        let (ledger, ctx, treasury) = seeded_ledger(&registry);
        let executor = TransactionExecutor::new(ledger, registry);

        let receipt = executor
            .execute(
                TokenCreateBuilder::new()
                    .name("Fungible")
                    .symbol("FNG")
                    .initial_supply(1000)
                    .treasury(treasury)
                    .build()
                    .unwrap(),
                &ctx,
            )
            .await
            .unwrap();
        assert!(receipt.token_id.is_some());
        assert_eq!(
            executor.token_supply(&receipt.token_id.unwrap()).await.unwrap(),
            1000
        );
    }

    #[tokio::test]
    async fn missing_signer_fails_before_submission() {
        let registry = registry_with(&[KeyRole::Operator, KeyRole::Treasury]);
        let (ledger, ctx, treasury) = seeded_ledger(&registry);
        let executor = TransactionExecutor::new(Arc::clone(&ledger), registry);

        // Token exists so only the signer is missing.
        let receipt = executor
            .execute(
                TokenCreateBuilder::new()
                    .name("Fungible")
                    .symbol("FNG")
                    .treasury(treasury)
                    .build()
                    .unwrap(),
                &ctx,
            )
            .await
            .unwrap();
        let token = receipt.token_id.unwrap();
        let submissions_before = ledger.submission_count();

        let err = executor
            .execute(
                TokenAssociateBuilder::new()
                    .account(treasury)
                    .token(token)
                    .direct()
                    .holder_role(KeyRole::Counterparty)
                    .build()
                    .unwrap(),
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::MissingSigner(KeyRole::Counterparty)));
        assert_eq!(ledger.submission_count(), submissions_before);
    }

    #[tokio::test]
    async fn rejection_carries_the_ledger_status() {
        let registry = registry_with(&[KeyRole::Operator, KeyRole::Treasury]);
        let (ledger, ctx, treasury) = seeded_ledger(&registry);
        let executor = TransactionExecutor::new(ledger, registry);

        let err = executor
            .execute(
                TokenAssociateBuilder::new()
                    .account(treasury)
                    .token(TokenId::new(9999))
                    .direct()
                    .holder_role(KeyRole::Treasury)
                    .build()
                    .unwrap(),
                &ctx,
            )
            .await
            .unwrap_err();
        match err {
            ExecutorError::LedgerRejection { kind, status } => {
                assert_eq!(kind, "associate-token");
                assert_eq!(status, ReceiptStatus::InvalidTokenId);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    /// Gateway whose submissions never complete.
    struct HangingGateway;

    #[async_trait]
    impl LedgerGateway for HangingGateway {
        async fn submit(&self, _operation: SignedOperation) -> Result<Receipt, GatewayError> {
            std::future::pending().await
        }

        async fn token_info(&self, _token: &TokenId) -> Result<TokenInfo, GatewayError> {
            std::future::pending().await
        }

        async fn account_balance(
            &self,
            _account: &AccountId,
        ) -> Result<AccountBalance, GatewayError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_timeout_is_distinct_from_rejection() {
        let registry = registry_with(&[KeyRole::Operator]);
        let ctx = NetworkContext::new("local", AccountId::new(1001));
        let executor = TransactionExecutor::new(Arc::new(HangingGateway), registry)
            .with_confirmation_timeout(Duration::from_millis(50));

        let err = executor
            .execute(
                TokenCreateBuilder::new()
                    .name("Fungible")
                    .symbol("FNG")
                    .treasury(AccountId::new(1002))
                    .treasury_role(KeyRole::Operator)
                    .build()
                    .unwrap(),
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::ConfirmationTimeout(_)));
    }
}
