pub mod error;
pub mod text_repo;

pub use error::{RepoError, RepoResult};
pub use text_repo::{SqliteTextRepository, Text, TextRepository};
