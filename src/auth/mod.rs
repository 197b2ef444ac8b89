// auth/mod.rs - Session bootstrap, token claims and capability checks

pub mod bootstrap;
pub mod claims;
pub mod permissions;

pub use bootstrap::{AuthBootstrap, AuthHandle, AuthPhase, AuthState};
pub use claims::{decode_access_token, AccessClaims, ClaimsError};
pub use permissions::{Capability, Permissions};
