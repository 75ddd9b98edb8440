//! Entity identifiers assigned by the ledger.
//!
//! Accounts, tokens, and contracts all live in one entity number space and
//! render as `0.0.<num>`. Contract call arguments use the EVM-style 20-byte
//! address derived from the entity number.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing an entity identifier from its `0.0.<num>` rendering.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdParseError {
    #[error("entity id must have the form <shard>.<realm>.<num>, got {0:?}")]
    MalformedId(String),

    #[error("entity number is not a valid integer: {0:?}")]
    InvalidNumber(String),

    #[error("evm address must be 20 hex-encoded bytes, got {0:?}")]
    MalformedAddress(String),
}

fn parse_entity_num(s: &str) -> Result<u64, IdParseError> {
    let mut parts = s.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("0"), Some("0"), Some(num), None) => num
            .parse::<u64>()
            .map_err(|_| IdParseError::InvalidNumber(num.to_string())),
        _ => Err(IdParseError::MalformedId(s.to_string())),
    }
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(num: u64) -> Self {
                Self(num)
            }

            /// Entity number within the ledger's number space.
            pub fn num(&self) -> u64 {
                self.0
            }

            /// EVM-style address used in contract call arguments.
            pub fn to_evm_address(&self) -> EvmAddress {
                EvmAddress::from_entity_num(self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0.0.{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_entity_num(s).map(Self)
            }
        }
    };
}

entity_id! {
    /// A ledger account.
    AccountId
}

entity_id! {
    /// A fungible token registered on the ledger.
    TokenId
}

entity_id! {
    /// A deployed contract.
    ContractId
}

// ── EVM-style address ────────────────────────────────────────────────

/// 20-byte address rendering of an entity number: 12 zero bytes followed
/// by the number in big-endian. Round-trips with [`EvmAddress::entity_num`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvmAddress(pub [u8; 20]);

impl EvmAddress {
    pub fn from_entity_num(num: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&num.to_be_bytes());
        Self(bytes)
    }

    /// Recover the entity number from an address in the ledger's space.
    pub fn entity_num(&self) -> u64 {
        let mut num = [0u8; 8];
        num.copy_from_slice(&self.0[12..]);
        u64::from_be_bytes(num)
    }

    pub fn from_hex(s: &str) -> Result<Self, IdParseError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|_| IdParseError::MalformedAddress(s.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| IdParseError::MalformedAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// ── Transaction identifier ───────────────────────────────────────────

/// Client-assigned identifier for one submitted operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_round_trips_through_display() {
        let id = TokenId::new(4812);
        assert_eq!(id.to_string(), "0.0.4812");
        assert_eq!("0.0.4812".parse::<TokenId>().unwrap(), id);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("4812".parse::<AccountId>().is_err());
        assert!("1.0.4812".parse::<AccountId>().is_err());
        assert!("0.0.abc".parse::<AccountId>().is_err());
    }

    #[test]
    fn evm_address_round_trips_entity_num() {
        let contract = ContractId::new(7001);
        let addr = contract.to_evm_address();
        assert_eq!(addr.entity_num(), 7001);
        assert_eq!(addr.to_string().len(), 40);
        assert_eq!(EvmAddress::from_hex(&addr.to_string()).unwrap(), addr);
    }
}
