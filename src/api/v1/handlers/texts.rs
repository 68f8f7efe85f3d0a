/*
 * Responsibility
 * - /texts 系 handler (GetAll / Save / Update)
 * - AuthCtx は extractor から受け取り、Identity を明示的に service に渡す
 * - validation と owner-scope は service 側で行う
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::texts::{
            GetAllResponse, SaveTextRequest, SaveTextResponse, TextResponse, UpdateTextRequest,
            UpdateTextResponse,
        },
        extractors::{AuthCtxExtractor, JsonBody, TextId},
    },
    error::AppError,
    state::AppState,
};

pub async fn get_all(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<GetAllResponse>, AppError> {
    let texts = state.texts.get_all(ctx.identity()).await?;

    Ok(Json(GetAllResponse {
        texts: texts.into_iter().map(TextResponse::from).collect(),
    }))
}

pub async fn save_text(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    JsonBody(req): JsonBody<SaveTextRequest>,
) -> Result<(StatusCode, Json<SaveTextResponse>), AppError> {
    let id = state
        .texts
        .save_text(ctx.identity(), &req.body, &req.info)
        .await?;

    Ok((StatusCode::CREATED, Json(SaveTextResponse { id })))
}

pub async fn update_text(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    TextId(id): TextId,
    JsonBody(req): JsonBody<UpdateTextRequest>,
) -> Result<Json<UpdateTextResponse>, AppError> {
    state
        .texts
        .update_text(ctx.identity(), id, &req.body, &req.info)
        .await?;

    Ok(Json(UpdateTextResponse {}))
}
