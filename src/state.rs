/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - secrets: SecretService (store は起動時に一度だけ生成して注入)
 *   - pages: HTML テンプレート
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - store の型はデフォルトで Cache (テストでは任意の CacheClient を注入できる)
 */
use std::sync::Arc;

use url::Url;

use crate::services::cache::{Cache, CacheClient};
use crate::services::secret::SecretService;
use crate::web::pages::Pages;

#[derive(Clone, Debug)]
pub struct AppState<C: CacheClient = Cache> {
    pub secrets: Arc<SecretService<C>>,
    pub pages: Arc<Pages>,
    // Overrides the Host-derived base for generated links.
    pub public_base_url: Option<Url>,
}

impl<C: CacheClient> AppState<C> {
    pub fn new(secrets: SecretService<C>, pages: Pages, public_base_url: Option<Url>) -> Self {
        Self {
            secrets: Arc::new(secrets),
            pages: Arc::new(pages),
            public_base_url,
        }
    }
}
