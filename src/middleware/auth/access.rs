//! access token (HMAC JWT) 検証 → AuthCtx を extensions に入れる
//!
//! - token は `authorization` header の値そのもの (scheme なし)。`Bearer ` が付いていれば外す
//! - 検証失敗の詳細はログにだけ残し、呼び出し元には一律 401 (UNAUTHENTICATED) を返す
//! - handler は AuthCtxExtractor 経由でのみ identity を受け取る

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// 認証が必要な routes に access middleware を適用する。
///
/// `route_layer` なので、存在しない path は 401 ではなく 404 のまま。
///
/// 例：
/// ```ignore
/// let texts = Router::new().route("/texts", get(get_all));
/// let texts = middleware::auth::access::apply(texts, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = access_token(req.headers()) else {
        tracing::warn!("access token is not provided");
        return Err(AppError::Unauthenticated);
    };

    let identity = match state.verifier.verify(token) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(reason = err.kind(), "access token verification failed");
            return Err(AppError::Unauthenticated);
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(identity));

    Ok(next.run(req).await)
}

// First `authorization` value, raw token or `Bearer <token>`.
fn access_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value);

    (!token.is_empty()).then_some(token)
}
