pub mod cli;
pub mod client;
pub mod config;
pub mod notify;
pub mod records;
pub mod router;
pub mod session;
pub mod validation;

use std::sync::Arc;

use anyhow::Result;

use client::HttpClient;
use config::Config;
use notify::NotificationBus;
use records::RecordStore;
use router::{MemoryNavigator, Navigator, Router};
use session::preferences::PreferenceStore;
use session::token::TokenStore;
use session::SessionManager;

/// Fully wired client stack: one instance of each state-owning component,
/// constructed in dependency order and sharing handles where needed.
pub struct AppContext {
    pub config: Config,
    pub notify: NotificationBus,
    pub token: TokenStore,
    pub client: HttpClient,
    pub session: Arc<SessionManager>,
    pub records: RecordStore,
    pub prefs: PreferenceStore,
    pub nav: Arc<MemoryNavigator>,
    pub router: Router,
}

impl AppContext {
    /// Wire the stack with a file-backed token store under the configured
    /// data directory.
    pub fn new(config: Config) -> Result<Self> {
        let token = TokenStore::persistent(
            &config.auth.data_dir,
            &config.auth.cookie_name,
            config.auth.token_ttl_days,
        )?;
        Ok(Self::with_token_store(config, token))
    }

    /// Wire the stack around an existing token store (in-memory for tests
    /// and embedded use).
    pub fn with_token_store(config: Config, token: TokenStore) -> Self {
        let notify = NotificationBus::new();
        let client = HttpClient::new(&config.api, token.clone(), notify.clone());
        let nav = Arc::new(MemoryNavigator::new());
        let nav_dyn: Arc<dyn Navigator> = nav.clone();
        let session = Arc::new(SessionManager::new(
            client.clone(),
            token.clone(),
            nav_dyn.clone(),
        ));
        let records = RecordStore::new(client.clone());
        let router = Router::new(session.clone(), nav_dyn);

        Self {
            config,
            notify,
            token,
            client,
            session,
            records,
            prefs: PreferenceStore::new(),
            nav,
            router,
        }
    }
}
