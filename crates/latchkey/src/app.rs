//! `Latchkey` builder: the composition root.
//!
//! This is where the layers meet. The builder opens the platform's store,
//! builds the one shared HTTP client, hands both to a session controller,
//! and starts hydration in the background.

use std::sync::Arc;

use latchkey_api::{ApiClient, ApiConfig, HttpAuthApi};
use latchkey_session::{SessionConfig, SessionContext, SessionController, SessionState};
use latchkey_store::{Platform, PlatformStore, SharedStorage, StoreConfig, WebStore};

use crate::LatchkeyError;

/// The controller type an app built with [`Latchkey`] runs.
pub type AppController = SessionController<PlatformStore, HttpAuthApi, ApiClient>;

/// The session handle an app built with [`Latchkey`] hands to its screens.
pub type AppSession = SessionContext<PlatformStore, HttpAuthApi, ApiClient>;

/// Builder for configuring and starting a session.
///
/// # Example
///
/// ```rust,no_run
/// use latchkey::prelude::*;
///
/// # async fn run() -> Result<(), LatchkeyError> {
/// let app = Latchkey::builder()
///     .base_url("https://api.example.com")
///     .store_config(StoreConfig::new("/data/app"))
///     .build()
///     .await?;
///
/// let session = app.context();
/// if session.wait_until_loaded().await.is_authenticated() {
///     // straight to the home screen
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LatchkeyBuilder {
    platform: Platform,
    store_config: StoreConfig,
    web_store: Option<WebStore<SharedStorage>>,
    api_config: ApiConfig,
    session_config: SessionConfig,
}

impl LatchkeyBuilder {
    /// Creates a new builder with default settings for the current target.
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
            store_config: StoreConfig::default(),
            web_store: None,
            api_config: ApiConfig::default(),
            session_config: SessionConfig::default(),
        }
    }

    /// Overrides the platform (and so the store backend).
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets where the native store keeps its files.
    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    /// Supplies the storage area the web backend wraps, such as a browser
    /// binding or `WebStore::from_backend(None)` where storage is disabled.
    /// Without one, web builds get a fresh in-memory area.
    pub fn web_store(mut self, store: WebStore<SharedStorage>) -> Self {
        self.web_store = Some(store);
        self
    }

    pub fn api_config(mut self, config: ApiConfig) -> Self {
        self.api_config = config;
        self
    }

    /// Shorthand for changing only the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.api_config.base_url = url.into();
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Opens the store, builds the client, and starts hydration.
    ///
    /// Returns as soon as everything is wired up; hydration continues in a
    /// spawned task. Use [`Latchkey::ready`] or
    /// [`SessionContext::wait_until_loaded`] to wait for it.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// [`LatchkeyError::Store`] if the native store can't be opened, or
    /// [`LatchkeyError::Api`] if the base URL is invalid.
    pub async fn build(self) -> Result<Latchkey, LatchkeyError> {
        let store =
            PlatformStore::open_with_web(self.platform, &self.store_config, self.web_store)
                .await?;
        let client = ApiClient::new(&self.api_config)?;
        let api = HttpAuthApi::new(client.clone());

        let controller = Arc::new(SessionController::new(
            store,
            api,
            client.clone(),
            self.session_config,
        ));

        let hydrating = Arc::clone(&controller);
        tokio::spawn(async move { hydrating.hydrate().await });

        tracing::info!(
            platform = %self.platform,
            base_url = client.base_url(),
            "latchkey started"
        );
        Ok(Latchkey { controller, client })
    }
}

impl Default for LatchkeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running session stack.
///
/// Cheap to keep around for the lifetime of the app. Hand
/// [`context()`](Self::context) to screens and [`api()`](Self::api) to
/// anything that calls the backend.
pub struct Latchkey {
    controller: Arc<AppController>,
    client: ApiClient,
}

impl Latchkey {
    /// Creates a new builder.
    pub fn builder() -> LatchkeyBuilder {
        LatchkeyBuilder::new()
    }

    pub fn context(&self) -> AppSession {
        self.controller.context()
    }

    pub fn controller(&self) -> &Arc<AppController> {
        &self.controller
    }

    /// The shared client. Requests built from it carry the current session.
    pub fn api(&self) -> &ApiClient {
        &self.client
    }

    /// Waits for startup hydration and returns the resulting state.
    pub async fn ready(&self) -> SessionState {
        self.controller.wait_until_loaded().await
    }
}
