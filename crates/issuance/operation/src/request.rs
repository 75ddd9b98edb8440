//! The seven operation kinds and their signing requirements.

use issuance_types::{AccountId, ContractId, EvmAddress, KeyRole, TokenId};
use serde::{Deserialize, Serialize};

/// A typed argument to a contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractArg {
    Address(EvmAddress),
    Int64(i64),
    Uint64(u64),
    Bytes(Vec<u8>),
}

/// Who holds a token's mint/burn authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyAuthority {
    /// A signing role resolved through the registry.
    Role(KeyRole),
    /// A deployed contract; the ledger honors mint/burn calls from it alone.
    Contract(ContractId),
}

/// How a token association is carried out.
///
/// Both ledger-level variants are first-class: a direct association
/// transaction signed by the holder, or a contract call performing the
/// association on the account's behalf. The workflow picks per run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationMode {
    Direct,
    ViaContract { contract: ContractId, gas_limit: u64 },
}

/// The identity granted a spending allowance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllowanceSpender {
    Account(AccountId),
    Contract(ContractId),
}

/// One ledger action, fully parameterized and ready to freeze.
///
/// Requests are built fresh per workflow step through the builders in
/// [`crate::builder`] and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationRequest {
    CreateAccount {
        initial_balance: u64,
        /// Hex-encoded ed25519 public key controlling the new account.
        public_key: String,
    },
    CreateFungibleToken {
        name: String,
        symbol: String,
        decimals: u8,
        initial_supply: u64,
        treasury: AccountId,
        /// Role whose signature authorizes binding the treasury.
        treasury_role: KeyRole,
        admin_key_role: KeyRole,
        supply_key_role: KeyRole,
    },
    DeployContract {
        bytecode: Vec<u8>,
        gas_limit: u64,
        constructor_args: Vec<ContractArg>,
    },
    UpdateTokenSupplyKey {
        token: TokenId,
        new_authority: SupplyAuthority,
        /// Role holding the token's admin key.
        admin_role: KeyRole,
    },
    InvokeContract {
        contract: ContractId,
        gas_limit: u64,
        function: String,
        args: Vec<ContractArg>,
        /// Roles whose authority the call exercises and who must co-sign.
        authorizers: Vec<KeyRole>,
    },
    AssociateToken {
        account: AccountId,
        token: TokenId,
        mode: AssociationMode,
        /// Role controlling the account; signs direct associations.
        holder_role: KeyRole,
    },
    ApproveAllowance {
        token: TokenId,
        owner: AccountId,
        owner_role: KeyRole,
        spender: AllowanceSpender,
        amount: u64,
    },
}

impl OperationRequest {
    /// Stable name of the operation kind, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            OperationRequest::CreateAccount { .. } => "create-account",
            OperationRequest::CreateFungibleToken { .. } => "create-fungible-token",
            OperationRequest::DeployContract { .. } => "deploy-contract",
            OperationRequest::UpdateTokenSupplyKey { .. } => "update-token-supply-key",
            OperationRequest::InvokeContract { .. } => "invoke-contract",
            OperationRequest::AssociateToken { .. } => "associate-token",
            OperationRequest::ApproveAllowance { .. } => "approve-allowance",
        }
    }

    /// The roles whose signatures this kind mandates, in signing order.
    ///
    /// The ledger rule: the account whose state is mutated, or whose
    /// allowance/supply authority is exercised, must sign. The submitting
    /// operator signs implicitly through the network context and is never
    /// listed here.
    pub fn required_signers(&self) -> Vec<KeyRole> {
        match self {
            OperationRequest::CreateAccount { .. } => Vec::new(),
            OperationRequest::CreateFungibleToken { treasury_role, .. } => {
                vec![treasury_role.clone()]
            }
            OperationRequest::DeployContract { .. } => Vec::new(),
            OperationRequest::UpdateTokenSupplyKey { admin_role, .. } => vec![admin_role.clone()],
            OperationRequest::InvokeContract { authorizers, .. } => authorizers.clone(),
            OperationRequest::AssociateToken { mode, holder_role, .. } => match mode {
                AssociationMode::Direct => vec![holder_role.clone()],
                AssociationMode::ViaContract { .. } => Vec::new(),
            },
            OperationRequest::ApproveAllowance { owner_role, .. } => vec![owner_role.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treasury_must_sign_token_creation() {
        let request = OperationRequest::CreateFungibleToken {
            name: "Fungible".into(),
            symbol: "FNG".into(),
            decimals: 0,
            initial_supply: 1000,
            treasury: AccountId::new(1002),
            treasury_role: KeyRole::Treasury,
            admin_key_role: KeyRole::Treasury,
            supply_key_role: KeyRole::Treasury,
        };
        assert_eq!(request.required_signers(), vec![KeyRole::Treasury]);
    }

    #[test]
    fn contract_association_needs_no_holder_signature() {
        let direct = OperationRequest::AssociateToken {
            account: AccountId::new(1003),
            token: TokenId::new(2001),
            mode: AssociationMode::Direct,
            holder_role: KeyRole::Counterparty,
        };
        assert_eq!(direct.required_signers(), vec![KeyRole::Counterparty]);

        let via_contract = OperationRequest::AssociateToken {
            account: AccountId::new(1003),
            token: TokenId::new(2001),
            mode: AssociationMode::ViaContract {
                contract: ContractId::new(3001),
                gas_limit: 3_000_000,
            },
            holder_role: KeyRole::Counterparty,
        };
        assert!(via_contract.required_signers().is_empty());
    }
}
