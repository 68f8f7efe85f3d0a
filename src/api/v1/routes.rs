/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /texts 系は全て access middleware (token 検証) の内側に置く
 */
use axum::{
    Router,
    routing::{get, put},
};

use crate::api::v1::handlers::texts::{get_all, save_text, update_text};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let texts = Router::new()
        .route("/texts", get(get_all).post(save_text))
        .route("/texts/{id}", put(update_text));

    middleware::auth::access::apply(texts, state)
}
