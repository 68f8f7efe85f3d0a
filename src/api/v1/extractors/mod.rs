pub mod auth_ctx;
pub mod json_body;
pub mod text_id;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use json_body::JsonBody;
pub use text_id::TextId;
