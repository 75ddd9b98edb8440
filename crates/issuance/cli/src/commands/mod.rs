pub mod generate_account;
pub mod run_flow;

use anyhow::Context;
use issuance_identity::{Identity, SignerRegistry};
use issuance_types::KeyRole;

/// Register a role's identity from hex secret material, or generate one.
pub fn register_identity(
    registry: &SignerRegistry,
    role: KeyRole,
    secret_hex: Option<&str>,
) -> anyhow::Result<std::sync::Arc<Identity>> {
    let identity = match secret_hex {
        Some(hex) => Identity::from_secret_hex(role.clone(), hex)
            .with_context(|| format!("loading key material for role {}", role))?,
        None => Identity::generate(role),
    };
    Ok(registry.register(identity)?)
}
