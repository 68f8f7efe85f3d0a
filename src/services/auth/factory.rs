/// Factory: build `AccessTokenVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AccessTokenVerifier, access_jwt::EmptySecret};

pub fn build_token_verifier(config: &Config) -> Result<Arc<AccessTokenVerifier>, EmptySecret> {
    let verifier =
        AccessTokenVerifier::new(&config.auth_secret, config.access_token_leeway_seconds)?;

    Ok(Arc::new(verifier))
}
