pub mod access_jwt;
pub mod factory;
pub mod identity;

pub use access_jwt::{AccessTokenVerifier, AuthError};
pub use factory::build_token_verifier;
pub use identity::Identity;
