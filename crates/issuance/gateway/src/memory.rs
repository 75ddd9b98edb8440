//! In-memory ledger used for tests, local demos, and embedding.
//!
//! Models the observable contract of the network: entity creation, token
//! supply and balances, associations, allowances, and contract-managed
//! supply — with per-kind signature requirements verified against the
//! frozen envelope digest. Consensus, fees, and the contract VM itself are
//! out of scope; contract calls dispatch on function name.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use ed25519_dalek::VerifyingKey;
use issuance_operation::{
    AllowanceSpender, AssociationMode, ContractArg, OperationRequest, SignedOperation,
    SupplyAuthority,
};
use issuance_types::{
    AccountBalance, AccountId, ContractId, Receipt, ReceiptStatus, TokenId, TokenInfo,
    TransactionId,
};

use crate::{GatewayError, LedgerGateway};

/// First entity number handed out; lower numbers stay reserved.
const FIRST_ENTITY_NUM: u64 = 1001;

struct AccountRecord {
    key: VerifyingKey,
    native: u64,
    /// Balance per associated token; presence of a key means associated.
    token_balances: BTreeMap<TokenId, u64>,
}

enum SupplyControl {
    /// Held by a key until delegated; direct key-signed supply changes
    /// are not part of the modelled surface.
    #[allow(dead_code)]
    Key(VerifyingKey),
    Contract(ContractId),
}

struct TokenRecord {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: u64,
    treasury: AccountId,
    admin_key: VerifyingKey,
    supply: SupplyControl,
}

struct ContractRecord {
    /// Digest of the deployed payload; kept for audit, not re-executed.
    #[allow(dead_code)]
    bytecode_hash: [u8; 32],
    bound_token: Option<TokenId>,
}

#[derive(Default)]
struct LedgerState {
    next_entity: u64,
    accounts: HashMap<AccountId, AccountRecord>,
    tokens: HashMap<TokenId, TokenRecord>,
    contracts: HashMap<ContractId, ContractRecord>,
    allowances: HashMap<(TokenId, AccountId, AllowanceSpender), u64>,
    submissions: u64,
}

impl LedgerState {
    fn alloc_entity(&mut self) -> u64 {
        if self.next_entity < FIRST_ENTITY_NUM {
            self.next_entity = FIRST_ENTITY_NUM;
        }
        let num = self.next_entity;
        self.next_entity += 1;
        num
    }

    fn account_by_evm(&self, addr_num: u64) -> Option<AccountId> {
        let id = AccountId::new(addr_num);
        self.accounts.contains_key(&id).then_some(id)
    }
}

/// In-memory [`LedgerGateway`] implementation.
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Seed a pre-existing account (operator, treasury) before a run.
    pub fn register_account(
        &self,
        key: VerifyingKey,
        native: u64,
    ) -> Result<AccountId, GatewayError> {
        let mut state = self.state.write().map_err(|_| GatewayError::LockPoisoned)?;
        let id = AccountId::new(state.alloc_entity());
        state.accounts.insert(
            id,
            AccountRecord {
                key,
                native,
                token_balances: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    /// How many operations have been submitted, accepted or rejected.
    pub fn submission_count(&self) -> u64 {
        self.state.read().map(|s| s.submissions).unwrap_or(0)
    }

    fn apply(state: &mut LedgerState, envelope: &SignedOperation) -> Receipt {
        let tx = envelope.operation.transaction_id.clone();
        let digest = envelope.signing_digest();

        // Every signature present must be cryptographically valid for this
        // envelope, whoever it belongs to.
        for signature in &envelope.signatures {
            if !signature.verify(&digest) {
                return Receipt::rejected(tx, ReceiptStatus::InvalidSignature);
            }
        }

        match envelope.operation.request.clone() {
            OperationRequest::CreateAccount {
                initial_balance,
                public_key,
            } => Self::create_account(state, tx, initial_balance, &public_key),
            OperationRequest::CreateFungibleToken {
                name,
                symbol,
                decimals,
                initial_supply,
                treasury,
                ..
            } => Self::create_token(
                state,
                tx,
                envelope,
                name,
                symbol,
                decimals,
                initial_supply,
                treasury,
            ),
            OperationRequest::DeployContract {
                bytecode,
                constructor_args,
                ..
            } => Self::deploy_contract(state, tx, &bytecode, &constructor_args),
            OperationRequest::UpdateTokenSupplyKey {
                token,
                new_authority,
                ..
            } => Self::update_supply_key(state, tx, envelope, token, new_authority),
            OperationRequest::InvokeContract {
                contract,
                function,
                args,
                ..
            } => Self::invoke_contract(state, tx, contract, &function, &args),
            OperationRequest::AssociateToken {
                account,
                token,
                mode,
                ..
            } => Self::associate_token(state, tx, envelope, account, token, mode),
            OperationRequest::ApproveAllowance {
                token,
                owner,
                spender,
                amount,
                ..
            } => Self::approve_allowance(state, tx, envelope, token, owner, spender, amount),
        }
    }

    fn signature_by_key(envelope: &SignedOperation, key: &VerifyingKey) -> bool {
        envelope
            .signatures
            .iter()
            .any(|s| s.verifying_key().as_ref() == Some(key))
    }

    fn create_account(
        state: &mut LedgerState,
        tx: TransactionId,
        initial_balance: u64,
        public_key: &str,
    ) -> Receipt {
        let key = hex::decode(public_key)
            .ok()
            .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
            .and_then(|bytes| VerifyingKey::from_bytes(&bytes).ok());
        let Some(key) = key else {
            return Receipt::rejected(tx, ReceiptStatus::BadKeyEncoding);
        };
        let id = AccountId::new(state.alloc_entity());
        state.accounts.insert(
            id,
            AccountRecord {
                key,
                native: initial_balance,
                token_balances: BTreeMap::new(),
            },
        );
        Receipt::success(tx).with_account(id)
    }

    #[allow(clippy::too_many_arguments)]
    fn create_token(
        state: &mut LedgerState,
        tx: TransactionId,
        envelope: &SignedOperation,
        name: String,
        symbol: String,
        decimals: u8,
        initial_supply: u64,
        treasury: AccountId,
    ) -> Receipt {
        let Some(treasury_key) = state.accounts.get(&treasury).map(|a| a.key) else {
            return Receipt::rejected(tx, ReceiptStatus::InvalidAccountId);
        };
        // Binding a treasury mutates that account; its key must have signed.
        if !Self::signature_by_key(envelope, &treasury_key) {
            return Receipt::rejected(tx, ReceiptStatus::MissingSignature);
        }

        let token = TokenId::new(state.alloc_entity());
        state.tokens.insert(
            token,
            TokenRecord {
                name,
                symbol,
                decimals,
                total_supply: initial_supply,
                treasury,
                admin_key: treasury_key,
                supply: SupplyControl::Key(treasury_key),
            },
        );
        if let Some(account) = state.accounts.get_mut(&treasury) {
            account.token_balances.insert(token, initial_supply);
        }
        Receipt::success(tx).with_token(token)
    }

    fn deploy_contract(
        state: &mut LedgerState,
        tx: TransactionId,
        bytecode: &[u8],
        constructor_args: &[ContractArg],
    ) -> Receipt {
        // The constructor binds the contract to the token whose address it
        // receives, when that token exists.
        let bound_token = constructor_args.iter().find_map(|arg| match arg {
            ContractArg::Address(addr) => {
                let id = TokenId::new(addr.entity_num());
                state.tokens.contains_key(&id).then_some(id)
            }
            _ => None,
        });

        let contract = ContractId::new(state.alloc_entity());
        state.contracts.insert(
            contract,
            ContractRecord {
                bytecode_hash: *blake3::hash(bytecode).as_bytes(),
                bound_token,
            },
        );
        Receipt::success(tx).with_contract(contract)
    }

    fn update_supply_key(
        state: &mut LedgerState,
        tx: TransactionId,
        envelope: &SignedOperation,
        token: TokenId,
        new_authority: SupplyAuthority,
    ) -> Receipt {
        let Some(admin_key) = state.tokens.get(&token).map(|t| t.admin_key) else {
            return Receipt::rejected(tx, ReceiptStatus::InvalidTokenId);
        };
        if !Self::signature_by_key(envelope, &admin_key) {
            return Receipt::rejected(tx, ReceiptStatus::MissingSignature);
        }

        let supply = match new_authority {
            SupplyAuthority::Contract(contract) => {
                if !state.contracts.contains_key(&contract) {
                    return Receipt::rejected(tx, ReceiptStatus::InvalidContractId);
                }
                SupplyControl::Contract(contract)
            }
            SupplyAuthority::Role(role) => {
                // A role authority takes effect through the key that signed
                // for it on this envelope.
                let Some(key) = envelope
                    .signature_for(&role)
                    .and_then(|s| s.verifying_key())
                else {
                    return Receipt::rejected(tx, ReceiptStatus::MissingSignature);
                };
                SupplyControl::Key(key)
            }
        };
        if let Some(record) = state.tokens.get_mut(&token) {
            record.supply = supply;
        }
        Receipt::success(tx)
    }

    fn invoke_contract(
        state: &mut LedgerState,
        tx: TransactionId,
        contract: ContractId,
        function: &str,
        args: &[ContractArg],
    ) -> Receipt {
        let Some(bound_token) = state.contracts.get(&contract).map(|c| c.bound_token) else {
            return Receipt::rejected(tx, ReceiptStatus::InvalidContractId);
        };

        let status = match function {
            "mintToken" => Self::call_mint(state, contract, bound_token, args, false),
            "burnToken" => Self::call_mint(state, contract, bound_token, args, true),
            "transferToken" => Self::call_transfer(state, contract, bound_token, args),
            "associate" => Self::call_associate(state, bound_token, args),
            _ => ReceiptStatus::ContractRevert(format!("unknown function {}", function)),
        };
        match status {
            ReceiptStatus::Success => Receipt::success(tx),
            status => Receipt::rejected(tx, status),
        }
    }

    fn call_amount(args: &[ContractArg]) -> Option<u64> {
        match args {
            [ContractArg::Int64(n)] if *n >= 0 => Some(*n as u64),
            [ContractArg::Uint64(n)] => Some(*n),
            _ => None,
        }
    }

    fn call_mint(
        state: &mut LedgerState,
        contract: ContractId,
        bound_token: Option<TokenId>,
        args: &[ContractArg],
        burn: bool,
    ) -> ReceiptStatus {
        let Some(token) = bound_token else {
            return ReceiptStatus::ContractRevert("no token bound".into());
        };
        let Some(amount) = Self::call_amount(args) else {
            return ReceiptStatus::ContractRevert("bad arguments".into());
        };
        let Some(record) = state.tokens.get_mut(&token) else {
            return ReceiptStatus::InvalidTokenId;
        };
        match record.supply {
            SupplyControl::Contract(holder) if holder == contract => {}
            _ => return ReceiptStatus::InvalidSupplyAuthority,
        }

        if burn {
            if record.total_supply < amount {
                return ReceiptStatus::InsufficientTokenBalance;
            }
            let treasury = record.treasury;
            let Some(balance) = state
                .accounts
                .get_mut(&treasury)
                .and_then(|a| a.token_balances.get_mut(&token))
            else {
                return ReceiptStatus::InvalidAccountId;
            };
            if *balance < amount {
                return ReceiptStatus::InsufficientTokenBalance;
            }
            *balance -= amount;
            // Re-borrow: the account borrow above ends before this point.
            if let Some(record) = state.tokens.get_mut(&token) {
                record.total_supply -= amount;
            }
        } else {
            let Some(new_supply) = record.total_supply.checked_add(amount) else {
                return ReceiptStatus::ContractRevert("supply overflow".into());
            };
            record.total_supply = new_supply;
            let treasury = record.treasury;
            if let Some(balance) = state
                .accounts
                .get_mut(&treasury)
                .and_then(|a| a.token_balances.get_mut(&token))
            {
                *balance += amount;
            }
        }
        ReceiptStatus::Success
    }

    fn call_transfer(
        state: &mut LedgerState,
        contract: ContractId,
        bound_token: Option<TokenId>,
        args: &[ContractArg],
    ) -> ReceiptStatus {
        let Some(token) = bound_token else {
            return ReceiptStatus::ContractRevert("no token bound".into());
        };
        let (from_addr, to_addr, amount) = match args {
            [ContractArg::Address(from), ContractArg::Address(to), ContractArg::Int64(n)]
                if *n >= 0 =>
            {
                (from, to, *n as u64)
            }
            _ => return ReceiptStatus::ContractRevert("bad arguments".into()),
        };
        let Some(from) = state.account_by_evm(from_addr.entity_num()) else {
            return ReceiptStatus::InvalidAccountId;
        };
        let Some(to) = state.account_by_evm(to_addr.entity_num()) else {
            return ReceiptStatus::InvalidAccountId;
        };
        if !state
            .accounts
            .get(&to)
            .map(|a| a.token_balances.contains_key(&token))
            .unwrap_or(false)
        {
            return ReceiptStatus::TokenNotAssociated;
        }

        // The contract spends the owner's tokens; its allowance caps that.
        let allowance_key = (token, from, AllowanceSpender::Contract(contract));
        let allowed = state.allowances.get(&allowance_key).copied().unwrap_or(0);
        if allowed < amount {
            return ReceiptStatus::AmountExceedsAllowance;
        }

        let from_balance = state
            .accounts
            .get(&from)
            .and_then(|a| a.token_balances.get(&token))
            .copied()
            .unwrap_or(0);
        if from_balance < amount {
            return ReceiptStatus::InsufficientTokenBalance;
        }

        if let Some(balance) = state
            .accounts
            .get_mut(&from)
            .and_then(|a| a.token_balances.get_mut(&token))
        {
            *balance -= amount;
        }
        if let Some(balance) = state
            .accounts
            .get_mut(&to)
            .and_then(|a| a.token_balances.get_mut(&token))
        {
            *balance += amount;
        }
        state.allowances.insert(allowance_key, allowed - amount);
        ReceiptStatus::Success
    }

    fn call_associate(
        state: &mut LedgerState,
        bound_token: Option<TokenId>,
        args: &[ContractArg],
    ) -> ReceiptStatus {
        let Some(token) = bound_token else {
            return ReceiptStatus::ContractRevert("no token bound".into());
        };
        let account = match args {
            [ContractArg::Address(addr)] => state.account_by_evm(addr.entity_num()),
            _ => return ReceiptStatus::ContractRevert("bad arguments".into()),
        };
        let Some(account) = account else {
            return ReceiptStatus::InvalidAccountId;
        };
        Self::mark_associated(state, account, token)
    }

    fn mark_associated(state: &mut LedgerState, account: AccountId, token: TokenId) -> ReceiptStatus {
        let Some(record) = state.accounts.get_mut(&account) else {
            return ReceiptStatus::InvalidAccountId;
        };
        if record.token_balances.contains_key(&token) {
            return ReceiptStatus::AlreadyAssociated;
        }
        record.token_balances.insert(token, 0);
        ReceiptStatus::Success
    }

    fn associate_token(
        state: &mut LedgerState,
        tx: TransactionId,
        envelope: &SignedOperation,
        account: AccountId,
        token: TokenId,
        mode: AssociationMode,
    ) -> Receipt {
        if !state.tokens.contains_key(&token) {
            return Receipt::rejected(tx, ReceiptStatus::InvalidTokenId);
        }
        let Some(holder_key) = state.accounts.get(&account).map(|a| a.key) else {
            return Receipt::rejected(tx, ReceiptStatus::InvalidAccountId);
        };

        match mode {
            AssociationMode::Direct => {
                // The holder opts in; nobody else may associate on its behalf.
                if !Self::signature_by_key(envelope, &holder_key) {
                    return Receipt::rejected(tx, ReceiptStatus::MissingSignature);
                }
            }
            AssociationMode::ViaContract { contract, .. } => {
                let Some(record) = state.contracts.get(&contract) else {
                    return Receipt::rejected(tx, ReceiptStatus::InvalidContractId);
                };
                if record.bound_token != Some(token) {
                    return Receipt::rejected(
                        tx,
                        ReceiptStatus::ContractRevert("token not managed by contract".into()),
                    );
                }
            }
        }

        match Self::mark_associated(state, account, token) {
            ReceiptStatus::Success => Receipt::success(tx),
            status => Receipt::rejected(tx, status),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn approve_allowance(
        state: &mut LedgerState,
        tx: TransactionId,
        envelope: &SignedOperation,
        token: TokenId,
        owner: AccountId,
        spender: AllowanceSpender,
        amount: u64,
    ) -> Receipt {
        if !state.tokens.contains_key(&token) {
            return Receipt::rejected(tx, ReceiptStatus::InvalidTokenId);
        }
        let Some(owner_key) = state.accounts.get(&owner).map(|a| a.key) else {
            return Receipt::rejected(tx, ReceiptStatus::InvalidAccountId);
        };
        if !Self::signature_by_key(envelope, &owner_key) {
            return Receipt::rejected(tx, ReceiptStatus::MissingSignature);
        }
        match &spender {
            AllowanceSpender::Contract(contract) => {
                if !state.contracts.contains_key(contract) {
                    return Receipt::rejected(tx, ReceiptStatus::InvalidContractId);
                }
            }
            AllowanceSpender::Account(account) => {
                if !state.accounts.contains_key(account) {
                    return Receipt::rejected(tx, ReceiptStatus::InvalidAccountId);
                }
            }
        }

        // Approval sets the cap; it does not accumulate.
        state.allowances.insert((token, owner, spender), amount);
        Receipt::success(tx)
    }
}

#[async_trait::async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn submit(&self, operation: SignedOperation) -> Result<Receipt, GatewayError> {
        let mut state = self.state.write().map_err(|_| GatewayError::LockPoisoned)?;
        state.submissions += 1;
        let receipt = Self::apply(&mut state, &operation);
        tracing::debug!(
            kind = operation.operation.request.kind(),
            transaction_id = %receipt.transaction_id,
            status = %receipt.status,
            "operation submitted"
        );
        Ok(receipt)
    }

    async fn token_info(&self, token: &TokenId) -> Result<TokenInfo, GatewayError> {
        let state = self.state.read().map_err(|_| GatewayError::LockPoisoned)?;
        let record = state
            .tokens
            .get(token)
            .ok_or(GatewayError::UnknownToken(*token))?;
        Ok(TokenInfo {
            token: *token,
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            decimals: record.decimals,
            total_supply: record.total_supply,
            treasury: record.treasury,
        })
    }

    async fn account_balance(&self, account: &AccountId) -> Result<AccountBalance, GatewayError> {
        let state = self.state.read().map_err(|_| GatewayError::LockPoisoned)?;
        let record = state
            .accounts
            .get(account)
            .ok_or(GatewayError::UnknownAccount(*account))?;
        Ok(AccountBalance {
            account: *account,
            native: record.native,
            tokens: record.token_balances.clone(),
        })
    }
}
