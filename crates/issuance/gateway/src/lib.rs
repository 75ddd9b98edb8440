//! Ledger gateway boundary.
//!
//! The [`LedgerGateway`] trait is the only door to the network: submit a
//! signed operation and receive a terminal receipt, or run one of the two
//! query surfaces used for post-condition checks. A success receipt means
//! the mutation is durably visible to subsequent queries on the same
//! gateway.
//!
//! Domain rejections travel inside receipts as status codes;
//! [`GatewayError`] is reserved for transport-level failures where no
//! verdict from the ledger exists at all.

#![deny(unsafe_code)]

pub mod memory;

use async_trait::async_trait;
use issuance_operation::SignedOperation;
use issuance_types::{AccountBalance, AccountId, Receipt, TokenId, TokenInfo};
use thiserror::Error;

pub use memory::InMemoryLedger;

/// Transport-level gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown token {0}")]
    UnknownToken(TokenId),

    #[error("unknown account {0}")]
    UnknownAccount(AccountId),

    #[error("ledger state lock poisoned")]
    LockPoisoned,

    #[error("network unavailable: {0}")]
    Unavailable(String),
}

/// Capability to reach the ledger network.
///
/// Implementations own any internal retry or polling against consensus
/// latency; callers see a single bounded round-trip per call.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Submit a signed operation and wait for its terminal receipt.
    async fn submit(&self, operation: SignedOperation) -> Result<Receipt, GatewayError>;

    /// Registered state of a token, including its total supply.
    async fn token_info(&self, token: &TokenId) -> Result<TokenInfo, GatewayError>;

    /// Holdings of an account across native units and associated tokens.
    async fn account_balance(&self, account: &AccountId) -> Result<AccountBalance, GatewayError>;
}
