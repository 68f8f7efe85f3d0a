/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: token 検証 (routes 単位) / http: 横断的な layer (router 全体)
 */
pub mod auth;
pub mod http;
