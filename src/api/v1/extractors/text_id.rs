/*
 * Responsibility
 * - Path の {id} を内部 ID (u64) として受け取る
 * - 数値でなければ InvalidArgument (axum 標準の plain-text 400 ではなく AppError の JSON で返す)
 * - 0 の扱い (必須エラー) は service 側で判定する
 */
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextId(pub u64);

impl FromRequestParts<AppState> for TextId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::invalid_argument("invalid id"))?;

        raw.parse::<u64>()
            .map(TextId)
            .map_err(|_| AppError::invalid_argument("invalid id"))
    }
}
