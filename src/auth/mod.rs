pub mod firebase;
pub mod verifier;

pub use firebase::FirebaseVerifier;
pub use verifier::{verifier_from_config, Identity, IdentityVerifier, StaticTokenVerifier};
