//! Signing identities for the issuance workflow.
//!
//! An [`Identity`] is an ed25519 keypair bound to a logical role; the
//! [`SignerRegistry`] resolves roles to identities and signs on their
//! behalf. Identities are constructed once at startup and never mutated;
//! concurrent operations share them read-only.

#![deny(unsafe_code)]

use ed25519_dalek::{SigningKey, VerifyingKey};
use issuance_operation::OperationSignature;
use issuance_types::KeyRole;
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors from identity resolution and key material handling.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no identity registered for role {0}")]
    UnknownRole(KeyRole),

    #[error("secret key must be 32 hex-encoded bytes")]
    InvalidKeyMaterial,

    #[error("identity registry lock poisoned")]
    LockPoisoned,
}

/// A role-bound ed25519 keypair.
pub struct Identity {
    role: KeyRole,
    signing_key: SigningKey,
}

impl Identity {
    /// Generate a fresh keypair for `role`.
    pub fn generate(role: KeyRole) -> Self {
        Self {
            role,
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Load an identity from hex-encoded secret key material.
    pub fn from_secret_hex(role: KeyRole, secret_hex: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(secret_hex).map_err(|_| IdentityError::InvalidKeyMaterial)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| IdentityError::InvalidKeyMaterial)?;
        Ok(Self {
            role,
            signing_key: SigningKey::from_bytes(&bytes),
        })
    }

    pub fn role(&self) -> &KeyRole {
        &self.role
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Hex rendering of the public key, as carried in operation parameters.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key().as_bytes())
    }

    /// Hex rendering of the secret key, for printing freshly generated
    /// account credentials.
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Sign an operation digest on behalf of this identity's role.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> OperationSignature {
        OperationSignature::create(self.role.clone(), &self.signing_key, digest)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secret key material stays out of Debug output.
        f.debug_struct("Identity")
            .field("role", &self.role)
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Named keypairs, resolved by role at signing time.
#[derive(Default)]
pub struct SignerRegistry {
    identities: RwLock<HashMap<KeyRole, Arc<Identity>>>,
}

impl SignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity under its role, replacing any previous holder.
    pub fn register(&self, identity: Identity) -> Result<Arc<Identity>, IdentityError> {
        let identity = Arc::new(identity);
        let mut identities = self
            .identities
            .write()
            .map_err(|_| IdentityError::LockPoisoned)?;
        identities.insert(identity.role().clone(), Arc::clone(&identity));
        Ok(identity)
    }

    /// Resolve a role to its identity.
    pub fn resolve(&self, role: &KeyRole) -> Result<Arc<Identity>, IdentityError> {
        let identities = self
            .identities
            .read()
            .map_err(|_| IdentityError::LockPoisoned)?;
        identities
            .get(role)
            .cloned()
            .ok_or_else(|| IdentityError::UnknownRole(role.clone()))
    }

    /// Whether a role is registered.
    pub fn contains(&self, role: &KeyRole) -> bool {
        self.identities
            .read()
            .map(|identities| identities.contains_key(role))
            .unwrap_or(false)
    }

    /// Sign `digest` as `role`.
    pub fn sign_as(
        &self,
        role: &KeyRole,
        digest: &[u8; 32],
    ) -> Result<OperationSignature, IdentityError> {
        Ok(self.resolve(role)?.sign_digest(digest))
    }

    /// Public key of the identity registered for `role`.
    pub fn public_key(&self, role: &KeyRole) -> Result<VerifyingKey, IdentityError> {
        Ok(self.resolve(role)?.verifying_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_roles_resolve_and_sign() {
        let registry = SignerRegistry::new();
        registry.register(Identity::generate(KeyRole::Treasury)).unwrap();

        let digest = [7u8; 32];
        let signature = registry.sign_as(&KeyRole::Treasury, &digest).unwrap();
        assert_eq!(signature.role, KeyRole::Treasury);
        assert!(signature.verify(&digest));
    }

    #[test]
    fn unknown_role_is_an_error() {
        let registry = SignerRegistry::new();
        let err = registry.sign_as(&KeyRole::Counterparty, &[0u8; 32]).unwrap_err();
        assert!(matches!(err, IdentityError::UnknownRole(KeyRole::Counterparty)));
    }

    #[test]
    fn secret_hex_round_trips() {
        let identity = Identity::generate(KeyRole::Operator);
        let reloaded =
            Identity::from_secret_hex(KeyRole::Operator, &identity.secret_key_hex()).unwrap();
        assert_eq!(identity.public_key_hex(), reloaded.public_key_hex());
    }

    #[test]
    fn malformed_key_material_is_rejected() {
        assert!(matches!(
            Identity::from_secret_hex(KeyRole::Operator, "not-hex"),
            Err(IdentityError::InvalidKeyMaterial)
        ));
        assert!(matches!(
            Identity::from_secret_hex(KeyRole::Operator, "abcd"),
            Err(IdentityError::InvalidKeyMaterial)
        ));
    }
}
