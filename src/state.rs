/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - texts: TextService, verifier: AccessTokenVerifier
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{TextService, auth::AccessTokenVerifier};

#[derive(Clone, Debug)]
pub struct AppState {
    pub texts: TextService,
    pub verifier: Arc<AccessTokenVerifier>,
}

impl AppState {
    pub fn new(texts: TextService, verifier: Arc<AccessTokenVerifier>) -> Self {
        Self { texts, verifier }
    }
}
