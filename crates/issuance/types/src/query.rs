//! Query results used for post-condition reads.
//!
//! Supply and balance figures are full-width `u64` end to end. The upstream
//! showcase read the low 32 bits of these values; amounts above `2^32`
//! would silently truncate there, so the narrow read is not reproduced.

use crate::{AccountId, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of a token's registered state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub token: TokenId,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64,
    pub treasury: AccountId,
}

/// Snapshot of an account's holdings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account: AccountId,
    /// Native-unit balance used to fund accounts at creation.
    pub native: u64,
    /// Balance per associated token. Absent key means not associated.
    pub tokens: BTreeMap<TokenId, u64>,
}

impl AccountBalance {
    /// Balance of one token; zero when the account holds none or is not
    /// associated with it.
    pub fn token_balance(&self, token: &TokenId) -> u64 {
        self.tokens.get(token).copied().unwrap_or(0)
    }

    /// Whether the account is associated with the token at all.
    pub fn holds(&self, token: &TokenId) -> bool {
        self.tokens.contains_key(token)
    }
}
