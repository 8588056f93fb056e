/*
 * Responsibility
 * - 一度きりのシークレットの作成 (id 生成 → TTL 付きで保存)
 * - 取得 = 削除 (store の atomic take を使う)
 * - 期間 (duration) のバリデーションは store を触る前に行う
 */
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::services::cache::{CacheClient, CacheError};
use crate::services::secret_id::SecretId;

/// Durations offered by the HTML form, in hours.
pub const FORM_DURATIONS_HOURS: [u32; 4] = [1, 6, 12, 24];

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret not found or expired")]
    NotFoundOrExpired,
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    // Never folded into NotFoundOrExpired: an outage must stay visible.
    #[error("secret store unavailable")]
    StoreUnavailable(CacheError),
}

impl From<CacheError> for SecretError {
    fn from(e: CacheError) -> Self {
        match e {
            // The backend refused the value itself (e.g. a TTL outside its range).
            CacheError::InvalidValue(reason) => SecretError::InvalidDuration(reason),
            other => SecretError::StoreUnavailable(other),
        }
    }
}

/// Parse the raw `duration` field of the HTML form.
///
/// Anything that is not a whole number of hours is an invalid duration, the
/// same as a number outside [`FORM_DURATIONS_HOURS`].
pub fn parse_form_duration(raw: &str) -> Result<u32, SecretError> {
    raw.trim().parse::<u32>().map_err(|_| {
        SecretError::InvalidDuration(format!(
            "duration must be one of {FORM_DURATIONS_HOURS:?} hours, got {raw:?}"
        ))
    })
}

#[derive(Debug, Clone)]
pub struct CreatedSecret {
    pub id: SecretId,
    pub expires_at: DateTime<Utc>,
}

/// One-shot secret storage on top of any `CacheClient`.
///
/// Per id: Pending until the first successful `consume`, the TTL elapsing, or
/// `discard`; Gone afterwards, for good.
#[derive(Clone, Debug)]
pub struct SecretService<C: CacheClient> {
    cache: C,
    // Keeps secrets apart from anything else sharing the backend.
    prefix: String,
    max_ttl: Duration,
}

impl<C: CacheClient> SecretService<C> {
    pub fn new(cache: C, prefix: impl Into<String>, max_hours: f64) -> Self {
        let max_ttl = Duration::try_from_secs_f64(max_hours * 3600.0).unwrap_or(Duration::MAX);

        Self {
            cache,
            prefix: prefix.into(),
            max_ttl,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    fn key(&self, id: &SecretId) -> String {
        format!("{}:{}", self.prefix, id)
    }

    /// Programmatic entry point: any positive duration up to the configured maximum.
    pub async fn create(&self, text: &str, hours: f64) -> Result<CreatedSecret, SecretError> {
        let ttl = self.ttl_from_hours(hours)?;
        self.store(text, ttl).await
    }

    /// Form entry point: only the fixed choices in [`FORM_DURATIONS_HOURS`].
    pub async fn create_from_form(
        &self,
        text: &str,
        hours: u32,
    ) -> Result<CreatedSecret, SecretError> {
        if !FORM_DURATIONS_HOURS.contains(&hours) {
            return Err(SecretError::InvalidDuration(format!(
                "duration must be one of {FORM_DURATIONS_HOURS:?} hours, got {hours}"
            )));
        }

        self.store(text, Duration::from_secs(u64::from(hours) * 3600))
            .await
    }

    /// Return the text and remove it in the same store operation.
    ///
    /// Concurrent calls for one id: exactly one gets the text, the rest get
    /// `NotFoundOrExpired`.
    pub async fn consume(&self, raw_id: &str) -> Result<String, SecretError> {
        let id = SecretId::parse(raw_id).ok_or(SecretError::NotFoundOrExpired)?;

        match self.cache.take_string(&self.key(&id)).await? {
            Some(text) => {
                tracing::info!(secret_id = %id, backend = self.backend_name(), "secret consumed");
                Ok(text)
            }
            None => {
                tracing::debug!(secret_id = %id, "secret not found or expired");
                Err(SecretError::NotFoundOrExpired)
            }
        }
    }

    /// Check that a secret is still pending without consuming it.
    ///
    /// Returns the normalized id for building follow-up links.
    pub async fn peek(&self, raw_id: &str) -> Result<SecretId, SecretError> {
        let id = SecretId::parse(raw_id).ok_or(SecretError::NotFoundOrExpired)?;

        self.cache
            .get_string(&self.key(&id))
            .await?
            .map(|_| id)
            .ok_or(SecretError::NotFoundOrExpired)
    }

    /// Remove a secret unread. Returns whether it was still stored.
    pub async fn discard(&self, raw_id: &str) -> Result<bool, SecretError> {
        let Some(id) = SecretId::parse(raw_id) else {
            return Ok(false);
        };

        let removed = self.cache.del(&self.key(&id)).await?;
        if removed {
            tracing::info!(secret_id = %id, "secret discarded");
        }
        Ok(removed)
    }

    async fn store(&self, text: &str, ttl: Duration) -> Result<CreatedSecret, SecretError> {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or_else(|| SecretError::InvalidDuration(format!("{ttl:?} is out of range")))?;

        let id = SecretId::generate();
        self.cache.set_with_ttl(&self.key(&id), text, ttl).await?;

        tracing::info!(
            secret_id = %id,
            backend = self.backend_name(),
            ttl_ms = ttl.as_millis() as u64,
            "secret created"
        );

        Ok(CreatedSecret { id, expires_at })
    }

    fn ttl_from_hours(&self, hours: f64) -> Result<Duration, SecretError> {
        let invalid = || {
            SecretError::InvalidDuration(format!(
                "duration must be a positive number of hours up to {}, got {hours}",
                self.max_ttl.as_secs_f64() / 3600.0
            ))
        };

        if !hours.is_finite() || hours <= 0.0 {
            return Err(invalid());
        }

        let ttl = Duration::try_from_secs_f64(hours * 3600.0).map_err(|_| invalid())?;
        if ttl.is_zero() || ttl > self.max_ttl {
            return Err(invalid());
        }

        Ok(ttl)
    }
}
