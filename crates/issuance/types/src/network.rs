//! Network context and signing roles.

use crate::AccountId;
use serde::{Deserialize, Serialize};

/// Logical signing role referenced by operations.
///
/// Roles decouple an operation's authority requirements from concrete key
/// material: an operation names the role whose signature it needs, and the
/// signer registry resolves the role to a keypair at execution time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyRole {
    /// The identity paying for and submitting operations.
    Operator,
    /// The account holding issued token supply.
    Treasury,
    /// The receiving party of the showcase transfer.
    Counterparty,
    /// Any other named role.
    Named(String),
}

impl KeyRole {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl std::fmt::Display for KeyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyRole::Operator => write!(f, "operator"),
            KeyRole::Treasury => write!(f, "treasury"),
            KeyRole::Counterparty => write!(f, "counterparty"),
            KeyRole::Named(name) => write!(f, "{}", name),
        }
    }
}

/// The target ledger network plus the default submitting identity.
///
/// Immutable once constructed. Several contexts may coexist in one process,
/// each driving an independent workflow run against its own network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    /// Network name, e.g. `"testnet"` or `"local"`.
    pub network: String,
    /// The account that implicitly signs and pays for every submission.
    pub operator_account: AccountId,
    /// The role the operator's keypair is registered under.
    pub operator_role: KeyRole,
}

impl NetworkContext {
    pub fn new(network: impl Into<String>, operator_account: AccountId) -> Self {
        Self {
            network: network.into(),
            operator_account,
            operator_role: KeyRole::Operator,
        }
    }

    pub fn with_operator_role(mut self, role: KeyRole) -> Self {
        self.operator_role = role;
        self
    }
}
