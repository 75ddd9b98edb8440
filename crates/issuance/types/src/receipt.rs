//! Terminal receipts for submitted operations.

use crate::{AccountId, ContractId, TokenId, TransactionId};
use serde::{Deserialize, Serialize};

/// Terminal status of a submitted operation.
///
/// A receipt's status is final: once the ledger has answered, the same
/// submission is never re-queried. Rejection codes are carried verbatim
/// into the executor's error so diagnostics see the ledger's own verdict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    MissingSignature,
    InvalidSignature,
    InvalidAccountId,
    BadKeyEncoding,
    InvalidTokenId,
    InvalidContractId,
    TokenNotAssociated,
    AlreadyAssociated,
    InsufficientTokenBalance,
    AmountExceedsAllowance,
    InvalidSupplyAuthority,
    ContractRevert(String),
}

impl ReceiptStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ReceiptStatus::Success)
    }
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiptStatus::Success => write!(f, "SUCCESS"),
            ReceiptStatus::MissingSignature => write!(f, "MISSING_SIGNATURE"),
            ReceiptStatus::InvalidSignature => write!(f, "INVALID_SIGNATURE"),
            ReceiptStatus::InvalidAccountId => write!(f, "INVALID_ACCOUNT_ID"),
            ReceiptStatus::BadKeyEncoding => write!(f, "BAD_KEY_ENCODING"),
            ReceiptStatus::InvalidTokenId => write!(f, "INVALID_TOKEN_ID"),
            ReceiptStatus::InvalidContractId => write!(f, "INVALID_CONTRACT_ID"),
            ReceiptStatus::TokenNotAssociated => write!(f, "TOKEN_NOT_ASSOCIATED_TO_ACCOUNT"),
            ReceiptStatus::AlreadyAssociated => write!(f, "TOKEN_ALREADY_ASSOCIATED_TO_ACCOUNT"),
            ReceiptStatus::InsufficientTokenBalance => write!(f, "INSUFFICIENT_TOKEN_BALANCE"),
            ReceiptStatus::AmountExceedsAllowance => write!(f, "AMOUNT_EXCEEDS_ALLOWANCE"),
            ReceiptStatus::InvalidSupplyAuthority => write!(f, "INVALID_SUPPLY_AUTHORITY"),
            ReceiptStatus::ContractRevert(reason) => write!(f, "CONTRACT_REVERT: {}", reason),
        }
    }
}

/// The ledger's confirmation record for one submission.
///
/// Kind-specific creation outputs are populated only for the operation
/// kinds that create entities; a pure invocation confirms with status alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub status: ReceiptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<ContractId>,
}

impl Receipt {
    /// A success receipt with no creation output.
    pub fn success(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            status: ReceiptStatus::Success,
            account_id: None,
            token_id: None,
            contract_id: None,
        }
    }

    /// A rejection receipt carrying the ledger's status code.
    pub fn rejected(transaction_id: TransactionId, status: ReceiptStatus) -> Self {
        Self {
            transaction_id,
            status,
            account_id: None,
            token_id: None,
            contract_id: None,
        }
    }

    pub fn with_account(mut self, account: AccountId) -> Self {
        self.account_id = Some(account);
        self
    }

    pub fn with_token(mut self, token: TokenId) -> Self {
        self.token_id = Some(token);
        self
    }

    pub fn with_contract(mut self, contract: ContractId) -> Self {
        self.contract_id = Some(contract);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
