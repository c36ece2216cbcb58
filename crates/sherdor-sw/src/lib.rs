//! # Sherdor Service Worker
//!
//! The background half of the Sherdor PWA.
//!
//! ## Features
//!
//! - **Install**: precache the fixed asset manifest, all-or-nothing
//! - **Fetch**: cache-first, falling back to the network without write-back
//! - **Push**: show a notification for every push message
//! - **Notification click**: open the app on `explore`, otherwise just close
//!
//! ## Architecture
//!
//! ```text
//! host runtime ── on_install / on_fetch / on_push / on_notification_click
//!     │
//!     └── ServiceWorker
//!             ├── CacheStorage ── Cache (cache_name) ── RequestKey → CacheEntry
//!             ├── Network            (fetch fallback, precache)
//!             ├── NotificationSink   (registration.showNotification)
//!             └── WindowClients      (clients.openWindow)
//! ```

use std::sync::Arc;

use futures::future::try_join_all;
use sherdor_core::config::PwaConfig;
use sherdor_core::error::{SherdorError, SherdorResult};
use sherdor_core::platform::{Network, NotificationSink, WindowClients};
use sherdor_core::types::{Request, Response};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, trace, warn};

pub mod cache;
pub mod push;

pub use cache::{Cache, CacheEntry, CacheStorage};
pub use push::{
    ClickTarget, DisplayedNotification, NotificationClickEvent, PushEvent, ACTION_CLOSE,
    ACTION_EXPLORE,
};

// ==================== Types ====================

/// Service worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceWorkerState {
    /// Script loaded, install not yet run.
    #[default]
    Parsed,
    /// Install event in progress.
    Installing,
    /// Installed, waiting for activation.
    Installed,
    /// Active and controlling pages.
    Activated,
    /// Install failed; this version will never control pages.
    Redundant,
}

/// Events emitted to the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceWorkerEvent {
    /// State changed.
    StateChange { new_state: ServiceWorkerState },
    /// A notification was handed to the platform.
    NotificationShown { title: String },
    /// A window was opened in response to a notification click.
    WindowOpened { url: String },
}

/// A fetch intercepted by the worker.
#[derive(Debug, Clone)]
pub struct FetchEvent {
    pub request: Request,
}

impl FetchEvent {
    pub fn new(request: Request) -> Self {
        Self { request }
    }
}

/// Host capabilities the worker runs against.
#[derive(Clone)]
pub struct WorkerCapabilities {
    pub network: Arc<dyn Network>,
    pub notifications: Arc<dyn NotificationSink>,
    pub clients: Arc<dyn WindowClients>,
}

// ==================== Service Worker ====================

/// One version of the service worker script.
pub struct ServiceWorker {
    config: PwaConfig,
    state: ServiceWorkerState,
    caches: Arc<RwLock<CacheStorage>>,
    capabilities: WorkerCapabilities,
    event_tx: mpsc::UnboundedSender<ServiceWorkerEvent>,
}

impl ServiceWorker {
    /// Create a worker over shared cache storage.
    ///
    /// Cache storage outlives worker versions, so it is passed in rather
    /// than owned.
    pub fn new(
        config: PwaConfig,
        caches: Arc<RwLock<CacheStorage>>,
        capabilities: WorkerCapabilities,
    ) -> (Self, mpsc::UnboundedReceiver<ServiceWorkerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        (
            Self {
                config,
                state: ServiceWorkerState::Parsed,
                caches,
                capabilities,
                event_tx,
            },
            event_rx,
        )
    }

    pub fn state(&self) -> ServiceWorkerState {
        self.state
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    fn set_state(&mut self, state: ServiceWorkerState) {
        self.state = state;
        let _ = self
            .event_tx
            .send(ServiceWorkerEvent::StateChange { new_state: state });
    }

    /// Handle the install event.
    ///
    /// Every manifest URL must fetch with a 2xx status before anything is
    /// written; on failure the cache is left without entries from this batch
    /// and the worker becomes redundant.
    pub async fn on_install(&mut self) -> SherdorResult<()> {
        if self.state != ServiceWorkerState::Parsed {
            return Err(SherdorError::invalid_state(format!(
                "install in state {:?}",
                self.state
            )));
        }
        self.set_state(ServiceWorkerState::Installing);

        match self.precache().await {
            Ok(count) => {
                info!(cache = %self.config.cache_name, entries = count, "Service worker installed");
                self.set_state(ServiceWorkerState::Installed);
                Ok(())
            }
            Err(e) => {
                warn!(cache = %self.config.cache_name, error = %e, "Service worker install failed");
                self.set_state(ServiceWorkerState::Redundant);
                Err(e)
            }
        }
    }

    async fn precache(&self) -> SherdorResult<usize> {
        let urls = self.config.precache_urls()?;
        self.caches.write().await.open(&self.config.cache_name);

        let network = Arc::clone(&self.capabilities.network);
        let fetches = urls.into_iter().map(|url| {
            let network = Arc::clone(&network);
            async move {
                let request = Request::get(url);
                let response = network.fetch(&request).await.map_err(|e| {
                    SherdorError::install(format!("{}: {}", request.url, e))
                })?;
                if !response.ok() {
                    return Err(SherdorError::install(format!(
                        "{}: status {}",
                        request.url, response.status
                    )));
                }
                debug!(url = %request.url, bytes = response.body.len(), "Precached");
                Ok::<_, SherdorError>(CacheEntry::capture(&request, response))
            }
        });
        let entries = try_join_all(fetches).await?;

        let count = entries.len();
        self.caches
            .write()
            .await
            .open(&self.config.cache_name)
            .put_all(entries);
        Ok(count)
    }

    /// Activate an installed worker.
    pub fn activate(&mut self) -> SherdorResult<()> {
        if self.state != ServiceWorkerState::Installed {
            return Err(SherdorError::invalid_state(format!(
                "activate in state {:?}",
                self.state
            )));
        }
        self.set_state(ServiceWorkerState::Activated);
        Ok(())
    }

    /// Handle a fetch event. Always resolves to a response.
    pub async fn on_fetch(&self, event: &FetchEvent) -> Response {
        {
            let caches = self.caches.read().await;
            if let Some(entry) = caches
                .get(&self.config.cache_name)
                .and_then(|cache| cache.match_request(&event.request))
            {
                trace!(url = %event.request.url, "Cache hit");
                return entry.to_response();
            }
        }

        trace!(url = %event.request.url, "Cache miss, going to network");
        match self.capabilities.network.fetch(&event.request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %event.request.url, error = %e, "Network fetch failed");
                Response::network_error(event.request.url.clone())
            }
        }
    }

    /// Handle a push message.
    pub async fn on_push(&self, event: &PushEvent) -> SherdorResult<()> {
        let notification = push::push_notification(
            &self.config,
            event.text(),
            chrono::Utc::now().timestamp_millis(),
        );
        let title = notification.title.clone();

        self.capabilities
            .notifications
            .show_notification(notification)
            .await?;

        debug!(title = %title, "Push notification shown");
        let _ = self
            .event_tx
            .send(ServiceWorkerEvent::NotificationShown { title });
        Ok(())
    }

    /// Handle a click on a notification or one of its actions.
    pub async fn on_notification_click(
        &self,
        event: &mut NotificationClickEvent,
    ) -> SherdorResult<()> {
        event.notification.close();

        if event.target() == ClickTarget::Explore {
            let root = self.config.origin_url()?.join("/")?;
            self.capabilities.clients.open_window(&root).await?;
            info!(url = %root, "Opened app from notification");
            let _ = self.event_tx.send(ServiceWorkerEvent::WindowOpened {
                url: root.to_string(),
            });
        }
        Ok(())
    }
}
