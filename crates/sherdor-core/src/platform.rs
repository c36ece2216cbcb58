//! Capability traits over the host platform and the hosted data store.
//!
//! Handlers never talk to a browser or a database directly. They are handed
//! implementations of these traits, so tests can drive them with in-memory
//! fakes and the binary can plug in HTTP-backed ones.

use async_trait::async_trait;
use url::Url;

use crate::error::SherdorResult;
use crate::types::{Collection, InstallOutcome, Notification, Permission, Request, Response};

/// Network access from the service worker context.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. An `Err` means the transport failed; HTTP error
    /// statuses are returned as `Ok` responses.
    async fn fetch(&self, request: &Request) -> SherdorResult<Response>;
}

/// `registration.showNotification()` in the service worker context.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn show_notification(&self, notification: Notification) -> SherdorResult<()>;
}

/// `clients` in the service worker context.
#[async_trait]
pub trait WindowClients: Send + Sync {
    /// Open (or focus) a window on `url`.
    async fn open_window(&self, url: &Url) -> SherdorResult<()>;
}

/// Notification API available to the UI context.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Whether the host exposes notifications at all.
    fn is_supported(&self) -> bool;

    /// Current permission as stored by the host.
    fn permission(&self) -> Permission;

    /// Run the user consent flow.
    async fn request_permission(&self) -> SherdorResult<Permission>;

    /// Show a notification. Fire-and-forget.
    fn show(&self, notification: Notification);
}

/// The deferred install prompt handed over by the platform.
#[async_trait]
pub trait DeferredPrompt: Send + Sync {
    /// Show the native prompt and wait for the user's choice.
    async fn prompt(&self) -> SherdorResult<InstallOutcome>;
}

/// Exact row counts from the hosted data store.
#[async_trait]
pub trait CountSource: Send + Sync {
    async fn count(&self, collection: Collection) -> SherdorResult<u64>;
}
