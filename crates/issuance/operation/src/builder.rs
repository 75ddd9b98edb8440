//! Validating builders, one per operation kind.
//!
//! Builders ensure every required field is provided and in range before an
//! [`OperationRequest`] exists at all; invalid parameter combinations fail
//! here, never at the gateway.

use crate::errors::ValidationError;
use crate::request::{
    AllowanceSpender, AssociationMode, ContractArg, OperationRequest, SupplyAuthority,
};
use crate::MAX_TOKEN_DECIMALS;
use issuance_types::{AccountId, ContractId, KeyRole, TokenId};

/// Builds [`OperationRequest::CreateAccount`].
#[derive(Default)]
pub struct AccountCreateBuilder {
    initial_balance: u64,
    public_key: Option<String>,
}

impl AccountCreateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_balance(mut self, balance: u64) -> Self {
        self.initial_balance = balance;
        self
    }

    /// Hex-encoded ed25519 public key for the new account.
    pub fn public_key(mut self, key_hex: impl Into<String>) -> Self {
        self.public_key = Some(key_hex.into());
        self
    }

    pub fn build(self) -> Result<OperationRequest, ValidationError> {
        let public_key = self.public_key.ok_or(ValidationError::MissingField {
            kind: "create-account",
            field: "public key",
        })?;
        match hex::decode(&public_key) {
            Ok(bytes) if bytes.len() == 32 => {}
            _ => return Err(ValidationError::InvalidPublicKey),
        }
        Ok(OperationRequest::CreateAccount {
            initial_balance: self.initial_balance,
            public_key,
        })
    }
}

/// Builds [`OperationRequest::CreateFungibleToken`].
#[derive(Default)]
pub struct TokenCreateBuilder {
    name: Option<String>,
    symbol: Option<String>,
    decimals: u8,
    initial_supply: u64,
    treasury: Option<AccountId>,
    treasury_role: Option<KeyRole>,
    admin_key_role: Option<KeyRole>,
    supply_key_role: Option<KeyRole>,
}

impl TokenCreateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn initial_supply(mut self, supply: u64) -> Self {
        self.initial_supply = supply;
        self
    }

    /// Treasury account receiving the initial supply (REQUIRED).
    pub fn treasury(mut self, account: AccountId) -> Self {
        self.treasury = Some(account);
        self
    }

    /// Role signing for the treasury account. Defaults to [`KeyRole::Treasury`].
    pub fn treasury_role(mut self, role: KeyRole) -> Self {
        self.treasury_role = Some(role);
        self
    }

    pub fn admin_key_role(mut self, role: KeyRole) -> Self {
        self.admin_key_role = Some(role);
        self
    }

    pub fn supply_key_role(mut self, role: KeyRole) -> Self {
        self.supply_key_role = Some(role);
        self
    }

    pub fn build(self) -> Result<OperationRequest, ValidationError> {
        let name = self.name.ok_or(ValidationError::MissingField {
            kind: "create-fungible-token",
            field: "name",
        })?;
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyTokenName);
        }
        let symbol = self.symbol.ok_or(ValidationError::MissingField {
            kind: "create-fungible-token",
            field: "symbol",
        })?;
        if symbol.trim().is_empty() {
            return Err(ValidationError::EmptyTokenSymbol);
        }
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(ValidationError::DecimalsOutOfRange(self.decimals));
        }
        let treasury = self.treasury.ok_or(ValidationError::MissingField {
            kind: "create-fungible-token",
            field: "treasury account",
        })?;
        let treasury_role = self.treasury_role.unwrap_or(KeyRole::Treasury);
        Ok(OperationRequest::CreateFungibleToken {
            name,
            symbol,
            decimals: self.decimals,
            initial_supply: self.initial_supply,
            treasury,
            admin_key_role: self.admin_key_role.unwrap_or(treasury_role.clone()),
            supply_key_role: self.supply_key_role.unwrap_or(treasury_role.clone()),
            treasury_role,
        })
    }
}

/// Builds [`OperationRequest::DeployContract`].
#[derive(Default)]
pub struct ContractDeployBuilder {
    bytecode: Vec<u8>,
    gas_limit: u64,
    constructor_args: Vec<ContractArg>,
}

impl ContractDeployBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytecode(mut self, bytecode: impl Into<Vec<u8>>) -> Self {
        self.bytecode = bytecode.into();
        self
    }

    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.gas_limit = gas;
        self
    }

    pub fn constructor_arg(mut self, arg: ContractArg) -> Self {
        self.constructor_args.push(arg);
        self
    }

    pub fn build(self) -> Result<OperationRequest, ValidationError> {
        if self.bytecode.is_empty() {
            return Err(ValidationError::EmptyBytecode);
        }
        if self.gas_limit == 0 {
            return Err(ValidationError::ZeroGasLimit);
        }
        Ok(OperationRequest::DeployContract {
            bytecode: self.bytecode,
            gas_limit: self.gas_limit,
            constructor_args: self.constructor_args,
        })
    }
}

/// Builds [`OperationRequest::UpdateTokenSupplyKey`].
#[derive(Default)]
pub struct SupplyKeyUpdateBuilder {
    token: Option<TokenId>,
    new_authority: Option<SupplyAuthority>,
    admin_role: Option<KeyRole>,
}

impl SupplyKeyUpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, token: TokenId) -> Self {
        self.token = Some(token);
        self
    }

    /// Hand supply control to a contract; the common delegation case.
    pub fn contract_authority(mut self, contract: ContractId) -> Self {
        self.new_authority = Some(SupplyAuthority::Contract(contract));
        self
    }

    pub fn role_authority(mut self, role: KeyRole) -> Self {
        self.new_authority = Some(SupplyAuthority::Role(role));
        self
    }

    /// Role holding the admin key. Defaults to [`KeyRole::Treasury`].
    pub fn admin_role(mut self, role: KeyRole) -> Self {
        self.admin_role = Some(role);
        self
    }

    pub fn build(self) -> Result<OperationRequest, ValidationError> {
        let token = self.token.ok_or(ValidationError::MissingField {
            kind: "update-token-supply-key",
            field: "token",
        })?;
        let new_authority = self.new_authority.ok_or(ValidationError::MissingField {
            kind: "update-token-supply-key",
            field: "new supply authority",
        })?;
        Ok(OperationRequest::UpdateTokenSupplyKey {
            token,
            new_authority,
            admin_role: self.admin_role.unwrap_or(KeyRole::Treasury),
        })
    }
}

/// Builds [`OperationRequest::InvokeContract`].
#[derive(Default, Debug)]
pub struct ContractInvokeBuilder {
    contract: Option<ContractId>,
    gas_limit: u64,
    function: Option<String>,
    args: Vec<ContractArg>,
    authorizers: Vec<KeyRole>,
}

impl ContractInvokeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contract(mut self, contract: ContractId) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.gas_limit = gas;
        self
    }

    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    pub fn arg(mut self, arg: ContractArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Checked conversion into the ledger's signed 64-bit argument type.
    pub fn amount_arg(mut self, amount: u64) -> Result<Self, ValidationError> {
        let amount =
            i64::try_from(amount).map_err(|_| ValidationError::AmountOutOfRange(amount))?;
        self.args.push(ContractArg::Int64(amount));
        Ok(self)
    }

    /// Require a co-signature from the role whose authority the call uses.
    pub fn authorizer(mut self, role: KeyRole) -> Self {
        self.authorizers.push(role);
        self
    }

    pub fn build(self) -> Result<OperationRequest, ValidationError> {
        let contract = self.contract.ok_or(ValidationError::MissingField {
            kind: "invoke-contract",
            field: "contract",
        })?;
        let function = self.function.ok_or(ValidationError::MissingField {
            kind: "invoke-contract",
            field: "function",
        })?;
        if function.trim().is_empty() {
            return Err(ValidationError::EmptyFunctionName);
        }
        if self.gas_limit == 0 {
            return Err(ValidationError::ZeroGasLimit);
        }
        Ok(OperationRequest::InvokeContract {
            contract,
            gas_limit: self.gas_limit,
            function,
            args: self.args,
            authorizers: self.authorizers,
        })
    }
}

/// Builds [`OperationRequest::AssociateToken`].
#[derive(Default)]
pub struct TokenAssociateBuilder {
    account: Option<AccountId>,
    token: Option<TokenId>,
    mode: Option<AssociationMode>,
    holder_role: Option<KeyRole>,
}

impl TokenAssociateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account: AccountId) -> Self {
        self.account = Some(account);
        self
    }

    pub fn token(mut self, token: TokenId) -> Self {
        self.token = Some(token);
        self
    }

    /// Direct association transaction signed by the holder.
    pub fn direct(mut self) -> Self {
        self.mode = Some(AssociationMode::Direct);
        self
    }

    /// Association performed by a contract call on the account's behalf.
    pub fn via_contract(mut self, contract: ContractId, gas_limit: u64) -> Self {
        self.mode = Some(AssociationMode::ViaContract {
            contract,
            gas_limit,
        });
        self
    }

    /// Role controlling the account. Defaults to [`KeyRole::Counterparty`].
    pub fn holder_role(mut self, role: KeyRole) -> Self {
        self.holder_role = Some(role);
        self
    }

    pub fn build(self) -> Result<OperationRequest, ValidationError> {
        let account = self.account.ok_or(ValidationError::MissingField {
            kind: "associate-token",
            field: "account",
        })?;
        let token = self.token.ok_or(ValidationError::MissingField {
            kind: "associate-token",
            field: "token",
        })?;
        let mode = self.mode.ok_or(ValidationError::MissingField {
            kind: "associate-token",
            field: "association mode",
        })?;
        if let AssociationMode::ViaContract { gas_limit, .. } = &mode {
            if *gas_limit == 0 {
                return Err(ValidationError::ZeroGasLimit);
            }
        }
        Ok(OperationRequest::AssociateToken {
            account,
            token,
            mode,
            holder_role: self.holder_role.unwrap_or(KeyRole::Counterparty),
        })
    }
}

/// Builds [`OperationRequest::ApproveAllowance`].
///
/// A zero amount is legal: it revokes (or never grants) spending headroom,
/// and the zero-transfer boundary case flows through it.
#[derive(Default)]
pub struct AllowanceApproveBuilder {
    token: Option<TokenId>,
    owner: Option<AccountId>,
    owner_role: Option<KeyRole>,
    spender: Option<AllowanceSpender>,
    amount: u64,
}

impl AllowanceApproveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, token: TokenId) -> Self {
        self.token = Some(token);
        self
    }

    pub fn owner(mut self, owner: AccountId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Role signing for the owner. Defaults to [`KeyRole::Treasury`].
    pub fn owner_role(mut self, role: KeyRole) -> Self {
        self.owner_role = Some(role);
        self
    }

    pub fn account_spender(mut self, account: AccountId) -> Self {
        self.spender = Some(AllowanceSpender::Account(account));
        self
    }

    pub fn contract_spender(mut self, contract: ContractId) -> Self {
        self.spender = Some(AllowanceSpender::Contract(contract));
        self
    }

    pub fn amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    pub fn build(self) -> Result<OperationRequest, ValidationError> {
        let token = self.token.ok_or(ValidationError::MissingField {
            kind: "approve-allowance",
            field: "token",
        })?;
        let owner = self.owner.ok_or(ValidationError::MissingField {
            kind: "approve-allowance",
            field: "owner",
        })?;
        let spender = self.spender.ok_or(ValidationError::MissingField {
            kind: "approve-allowance",
            field: "spender",
        })?;
        Ok(OperationRequest::ApproveAllowance {
            token,
            owner,
            owner_role: self.owner_role.unwrap_or(KeyRole::Treasury),
            spender,
            amount: self.amount,
        })
    }
}
