pub mod health;
pub mod texts;
