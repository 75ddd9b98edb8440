//! Builder validation errors.
//!
//! Every variant is raised during construction, before any network
//! interaction, and is fatal to the step that requested the operation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} requires {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("token name must not be empty")]
    EmptyTokenName,

    #[error("token symbol must not be empty")]
    EmptyTokenSymbol,

    #[error("token decimals {0} outside supported range 0..={max}", max = crate::MAX_TOKEN_DECIMALS)]
    DecimalsOutOfRange(u8),

    #[error("gas limit must be positive")]
    ZeroGasLimit,

    #[error("contract bytecode must not be empty")]
    EmptyBytecode,

    #[error("public key must be 32 hex-encoded bytes")]
    InvalidPublicKey,

    #[error("contract function name must not be empty")]
    EmptyFunctionName,

    #[error("amount {0} exceeds the ledger's signed 64-bit argument range")]
    AmountOutOfRange(u64),
}
