/*
 * Responsibility
 * - texts の業務ロジック (GetAll / Save / Update)
 * - 入力の形式チェック (body 必須, id != 0)
 * - 永続化は TextRepository に委譲し、常に Identity の uid で owner-scope する
 * - repo のエラー詳細はログにのみ残し、呼び出し元には分類だけ返す
 */
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::repos::{RepoError, Text, TextRepository};
use crate::services::auth::Identity;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("internal error")]
    Internal(#[source] RepoError),
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Timeout => Self::DeadlineExceeded,
            e => Self::Internal(e),
        }
    }
}

/// Stateless facade over the owner-scoped text operations.
///
/// The caller's identity is an explicit parameter on every method; there is
/// no way to reach the repository without one.
#[derive(Clone)]
pub struct TextService {
    repo: Arc<dyn TextRepository>,
}

impl std::fmt::Debug for TextService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextService").finish_non_exhaustive()
    }
}

impl TextService {
    pub fn new(repo: Arc<dyn TextRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip_all, fields(op = "texts.get_all", uid = identity.uid()))]
    pub async fn get_all(&self, identity: &Identity) -> Result<Vec<Text>, ServiceError> {
        debug!("attempting to get all texts");

        let texts = self
            .repo
            .list_by_owner(identity.uid())
            .await
            .map_err(|e| {
                error!(error = ?e, "failed to get all texts");
                ServiceError::from(e)
            })?;

        debug!(count = texts.len(), "texts fetched");
        Ok(texts)
    }

    #[instrument(skip_all, fields(op = "texts.save", uid = identity.uid()))]
    pub async fn save_text(
        &self,
        identity: &Identity,
        body: &str,
        info: &str,
    ) -> Result<u64, ServiceError> {
        if body.is_empty() {
            debug!("rejected: empty body");
            return Err(ServiceError::InvalidArgument("text is required"));
        }

        let id = self
            .repo
            .insert(body, info, identity.uid())
            .await
            .map_err(|e| {
                error!(error = ?e, "failed to save text");
                ServiceError::from(e)
            })?;

        debug!(id, "text saved");
        Ok(id)
    }

    /// Overwrite body/info of one of the caller's texts.
    ///
    /// Updating an id that does not exist, or that belongs to someone else,
    /// succeeds without effect; both cases look the same to the caller.
    #[instrument(skip_all, fields(op = "texts.update", uid = identity.uid(), id = id))]
    pub async fn update_text(
        &self,
        identity: &Identity,
        id: u64,
        body: &str,
        info: &str,
    ) -> Result<(), ServiceError> {
        if id == 0 {
            debug!("rejected: zero id");
            return Err(ServiceError::InvalidArgument("id is required"));
        }
        if body.is_empty() {
            debug!("rejected: empty body");
            return Err(ServiceError::InvalidArgument("text is required"));
        }

        let affected = self
            .repo
            .update_owned(id, body, info, identity.uid())
            .await
            .map_err(|e| {
                error!(error = ?e, "failed to update text");
                ServiceError::from(e)
            })?;

        if affected == 0 {
            debug!("no owned text matched");
        } else {
            debug!("text updated");
        }
        Ok(())
    }
}
