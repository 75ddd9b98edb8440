//! Issuance domain types
//!
//! Shared value types for the issuance workflow: entity identifiers,
//! the network context an operation is executed against, terminal
//! receipts, and the query results used for post-condition checks.
//!
//! Everything in this crate is a plain value object. Construction happens
//! once, mutation never; operations, executors, and workflows share these
//! types read-only.

#![deny(unsafe_code)]

pub mod ids;
pub mod network;
pub mod query;
pub mod receipt;

pub use ids::{AccountId, ContractId, EvmAddress, IdParseError, TokenId, TransactionId};
pub use network::{KeyRole, NetworkContext};
pub use query::{AccountBalance, TokenInfo};
pub use receipt::{Receipt, ReceiptStatus};
