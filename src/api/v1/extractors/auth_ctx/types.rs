/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - extensions は型で引くので、文字列キーや型違いの値を uid と取り違えることはない
 */
use crate::services::auth::Identity;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `identity` は検証済みトークンから得た呼び出し元 (1 リクエストの間だけ有効)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCtx {
    identity: Identity,
}

impl AuthCtx {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
