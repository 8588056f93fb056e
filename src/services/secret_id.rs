/*
 * Responsibility
 * - 公開 ID (URL に載る文字列) の生成と検証
 * - 128-bit のランダム値 (UUID v4) を使い、再利用されない
 * - 形式が不正な ID は store に問い合わせる前に弾く
 */
use std::fmt;

use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SecretId(Uuid);

impl SecretId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Accepts any textual UUID form; `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::try_parse(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Always the hyphenated lowercase form, so one id maps to one store key.
        write!(f, "{}", self.0.hyphenated())
    }
}
