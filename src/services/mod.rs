pub mod cache;
pub mod secret;
pub mod secret_id;
