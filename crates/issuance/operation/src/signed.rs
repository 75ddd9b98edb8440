//! Freezing and signing envelopes.
//!
//! Freezing binds a request to one network context and execution window;
//! the signing digest covers the whole frozen envelope, so a signature is
//! only ever valid for that binding.

use crate::request::OperationRequest;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use issuance_types::{AccountId, KeyRole, NetworkContext, TransactionId};
use serde::{Deserialize, Serialize};

/// An [`OperationRequest`] bound to a network context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenOperation {
    pub request: OperationRequest,
    pub transaction_id: TransactionId,
    pub network: String,
    pub operator_account: AccountId,
    pub frozen_at: DateTime<Utc>,
}

impl OperationRequest {
    /// Bind the request to `ctx`, fixing its execution parameters.
    ///
    /// Consumes the request: after freezing, only the frozen envelope can
    /// be signed and submitted.
    pub fn freeze(self, ctx: &NetworkContext) -> FrozenOperation {
        FrozenOperation {
            request: self,
            transaction_id: TransactionId::generate(),
            network: ctx.network.clone(),
            operator_account: ctx.operator_account,
            frozen_at: Utc::now(),
        }
    }
}

impl FrozenOperation {
    /// Digest every signature on this operation covers.
    ///
    /// Canonical serialization: JSON of the envelope hashed with blake3.
    pub fn signing_digest(&self) -> [u8; 32] {
        let bytes = serde_json::to_vec(self).expect("frozen operation serializable");
        *blake3::hash(&bytes).as_bytes()
    }

    /// Move to the signing stage. No signature can exist before this point.
    pub fn into_signed(self) -> SignedOperation {
        SignedOperation {
            operation: self,
            signatures: Vec::new(),
        }
    }
}

/// One signature applied to a frozen operation.
///
/// Key and signature are hex-encoded so envelopes stay printable in logs
/// and fixtures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSignature {
    pub role: KeyRole,
    pub public_key: String,
    pub signature: String,
}

impl OperationSignature {
    /// Sign `digest` with `key` on behalf of `role`.
    pub fn create(role: KeyRole, key: &SigningKey, digest: &[u8; 32]) -> Self {
        let signature = key.sign(digest);
        Self {
            role,
            public_key: hex::encode(key.verifying_key().as_bytes()),
            signature: hex::encode(signature.to_bytes()),
        }
    }

    /// The verifying key, if the stored encoding is well-formed.
    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        let bytes = hex::decode(&self.public_key).ok()?;
        let bytes: [u8; 32] = bytes.try_into().ok()?;
        VerifyingKey::from_bytes(&bytes).ok()
    }

    /// Whether this signature is cryptographically valid for `digest`.
    pub fn verify(&self, digest: &[u8; 32]) -> bool {
        let Some(key) = self.verifying_key() else {
            return false;
        };
        let Ok(sig_bytes) = hex::decode(&self.signature) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match sig_bytes.try_into() {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let signature = Signature::from_bytes(&sig_bytes);
        key.verify(digest, &signature).is_ok()
    }
}

/// A frozen operation plus the ordered signatures applied to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOperation {
    pub operation: FrozenOperation,
    pub signatures: Vec<OperationSignature>,
}

impl SignedOperation {
    pub fn attach(&mut self, signature: OperationSignature) {
        self.signatures.push(signature);
    }

    /// The signature a given role applied, if any.
    pub fn signature_for(&self, role: &KeyRole) -> Option<&OperationSignature> {
        self.signatures.iter().find(|s| &s.role == role)
    }

    /// The digest all attached signatures must cover.
    pub fn signing_digest(&self) -> [u8; 32] {
        self.operation.signing_digest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AccountCreateBuilder;
    use rand::rngs::OsRng;

    fn frozen_request() -> FrozenOperation {
        let ctx = NetworkContext::new("local", AccountId::new(2));
        AccountCreateBuilder::new()
            .initial_balance(100)
            .public_key("ab".repeat(32))
            .build()
            .unwrap()
            .freeze(&ctx)
    }

    #[test]
    fn signature_covers_the_frozen_envelope() {
        let frozen = frozen_request();
        let digest = frozen.signing_digest();
        let key = SigningKey::generate(&mut OsRng);
        let signature = OperationSignature::create(KeyRole::Operator, &key, &digest);
        assert!(signature.verify(&digest));
    }

    #[test]
    fn signature_fails_for_another_envelope() {
        let first = frozen_request();
        let second = frozen_request();
        let key = SigningKey::generate(&mut OsRng);
        let signature = OperationSignature::create(KeyRole::Operator, &key, &first.signing_digest());
        // Different transaction id, different digest.
        assert!(!signature.verify(&second.signing_digest()));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let frozen = frozen_request();
        let digest = frozen.signing_digest();
        let key = SigningKey::generate(&mut OsRng);
        let mut signature = OperationSignature::create(KeyRole::Operator, &key, &digest);
        signature.signature = "00".repeat(64);
        assert!(!signature.verify(&digest));
    }

    #[test]
    fn signatures_are_looked_up_by_role() {
        let frozen = frozen_request();
        let digest = frozen.signing_digest();
        let key = SigningKey::generate(&mut OsRng);
        let mut signed = frozen.into_signed();
        signed.attach(OperationSignature::create(KeyRole::Treasury, &key, &digest));
        assert!(signed.signature_for(&KeyRole::Treasury).is_some());
        assert!(signed.signature_for(&KeyRole::Operator).is_none());
    }
}
