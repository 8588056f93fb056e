/*
 * Responsibility
 * - フォーム/HTML 側の公開ポイント
 * - store には SecretService 経由でしか触らない
 */
pub mod handlers;
pub mod pages;
mod routes;

pub use routes::routes;
