//! Common types shared by the service worker and UI contexts

use bytes::Bytes;
use hashbrown::HashMap;
use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

// ==================== Fetch ====================

/// An outgoing request as seen by the service worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HashMap<String, String>,
}

impl Request {
    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HashMap::new(),
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Identity used to key cache entries.
    pub fn key(&self) -> RequestKey {
        RequestKey {
            method: self.method.as_str().to_string(),
            url: self.url.to_string(),
        }
    }
}

/// Cache key: method plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response, either from the network or replayed from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: Url,
    /// Status code. 0 marks a network error.
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
    /// Whether this response was served from the cache.
    pub from_cache: bool,
}

impl Response {
    /// Create a network error response.
    pub fn network_error(url: Url) -> Self {
        Self {
            url,
            status: 0,
            status_text: "Network Error".to_string(),
            headers: HashMap::new(),
            body: Bytes::new(),
            from_cache: false,
        }
    }

    /// Check if the status is 2xx.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if this is a network error response.
    pub fn is_network_error(&self) -> bool {
        self.status == 0
    }
}

// ==================== Notifications ====================

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Default => "default",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A button shown on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Identifier reported back on click.
    pub action: String,
    /// Human-readable label.
    pub title: String,
    pub icon: Option<String>,
}

/// Extra data attached to a pushed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    /// Vibration pattern in milliseconds (on, off, on, ...).
    pub vibrate: Vec<u32>,
    pub data: Option<NotificationData>,
    pub actions: Vec<NotificationAction>,
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            options: NotificationOptions {
                body: body.into(),
                ..Default::default()
            },
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.options.icon = Some(icon.into());
        self
    }

    pub fn badge(mut self, badge: impl Into<String>) -> Self {
        self.options.badge = Some(badge.into());
        self
    }

    pub fn vibrate(mut self, pattern: &[u32]) -> Self {
        self.options.vibrate = pattern.to_vec();
        self
    }

    pub fn data(mut self, data: NotificationData) -> Self {
        self.options.data = Some(data);
        self
    }

    pub fn action(mut self, action: NotificationAction) -> Self {
        self.options.actions.push(action);
        self
    }

    pub fn body(&self) -> &str {
        &self.options.body
    }
}

// ==================== Install prompt ====================

/// The user's answer to the install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

// ==================== Data store ====================

/// Collections counted on the reports page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Goods
    Tovarlar,
    /// Orders
    Zakazlar,
    /// Furniture production
    Mebel,
    /// Edge-banding production
    Kronka,
}

impl Collection {
    /// All collections, in display order.
    pub const ALL: [Collection; 4] = [
        Collection::Tovarlar,
        Collection::Zakazlar,
        Collection::Mebel,
        Collection::Kronka,
    ];

    /// Table name in the data store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Tovarlar => "tovarlar",
            Collection::Zakazlar => "zakazlar",
            Collection::Mebel => "mebel",
            Collection::Kronka => "kronka",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_key_includes_method() {
        let url = Url::parse("https://example.com/manifest.json").unwrap();
        let get = Request::get(url.clone());
        let mut head = Request::get(url);
        head.method = Method::HEAD;

        assert_ne!(get.key(), head.key());
        assert_eq!(get.key().to_string(), "GET https://example.com/manifest.json");
    }

    #[test]
    fn test_network_error_response() {
        let response = Response::network_error(Url::parse("https://example.com/").unwrap());
        assert!(response.is_network_error());
        assert!(!response.ok());
        assert!(!response.from_cache);
    }

    #[test]
    fn test_permission_serde() {
        let json = serde_json::to_string(&Permission::Granted).unwrap();
        assert_eq!(json, "\"granted\"");
        let parsed: Permission = serde_json::from_str("\"denied\"").unwrap();
        assert_eq!(parsed, Permission::Denied);
    }

    #[test]
    fn test_notification_builder() {
        let n = Notification::new("Sherdor Mebel", "Yangi xabar")
            .icon("/icon-192.jpg")
            .vibrate(&[100, 50, 100]);
        assert_eq!(n.body(), "Yangi xabar");
        assert_eq!(n.options.icon.as_deref(), Some("/icon-192.jpg"));
        assert_eq!(n.options.vibrate, vec![100, 50, 100]);
        assert!(n.options.actions.is_empty());
    }

    #[test]
    fn test_collection_names() {
        let names: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["tovarlar", "zakazlar", "mebel", "kronka"]);
    }
}
