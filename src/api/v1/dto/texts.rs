/*
 * Responsibility
 * - Texts の request/response DTO
 * - owner / uid は DTO に持たせない (identity は token からのみ得る)
 */
use serde::{Deserialize, Serialize};

use crate::repos::Text;

#[derive(Debug, Deserialize)]
pub struct SaveTextRequest {
    // `text` is the field name existing clients send
    #[serde(alias = "text")]
    pub body: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTextRequest {
    #[serde(alias = "text")]
    pub body: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub id: u64,
    pub body: String,
    pub info: String,
}

impl From<Text> for TextResponse {
    fn from(text: Text) -> Self {
        Self {
            id: text.id,
            body: text.body,
            info: text.info,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetAllResponse {
    pub texts: Vec<TextResponse>,
}

#[derive(Debug, Serialize)]
pub struct SaveTextResponse {
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub struct UpdateTextResponse {}
