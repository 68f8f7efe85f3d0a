pub mod auth;
pub mod texts;

pub use texts::{ServiceError, TextService};
