/*
 * Responsibility
 * - /api/create, /api/get の request/response DTO
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_duration_hours() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct CreateSecretRequest {
    pub text: String,
    // Hours; fractions allowed.
    #[serde(default = "default_duration_hours")]
    pub duration: f64,
}

#[derive(Debug, Serialize)]
pub struct CreateSecretResponse {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SecretTextResponse {
    pub text: String,
}
