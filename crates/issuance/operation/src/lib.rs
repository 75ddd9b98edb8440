//! Operation construction for the issuance workflow.
//!
//! This crate is pure construction: builders validate parameters and produce
//! immutable [`OperationRequest`] values, which are then bound to a network
//! context ("frozen") and signed. Nothing here performs I/O — submission and
//! receipt handling belong to the executor and gateway.
//!
//! The freeze-before-sign rule is enforced by the types: signatures can only
//! be attached to a [`FrozenOperation`], and freezing consumes the request.

#![deny(unsafe_code)]

pub mod builder;
pub mod errors;
pub mod request;
pub mod signed;

pub use builder::{
    AccountCreateBuilder, AllowanceApproveBuilder, ContractDeployBuilder, ContractInvokeBuilder,
    SupplyKeyUpdateBuilder, TokenAssociateBuilder, TokenCreateBuilder,
};
pub use errors::ValidationError;
pub use request::{
    AllowanceSpender, AssociationMode, ContractArg, OperationRequest, SupplyAuthority,
};
pub use signed::{FrozenOperation, OperationSignature, SignedOperation};

/// Token decimals accepted by the ledger.
pub const MAX_TOKEN_DECIMALS: u8 = 18;
