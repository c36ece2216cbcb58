//! Push payloads and notification clicks.

use bytes::Bytes;
use sherdor_core::config::PwaConfig;
use sherdor_core::types::{Notification, NotificationAction, NotificationData};

/// Action id that opens the app.
pub const ACTION_EXPLORE: &str = "explore";
/// Action id that only dismisses.
pub const ACTION_CLOSE: &str = "close";

const EXPLORE_LABEL: &str = "Ko'rish";
const CLOSE_LABEL: &str = "Yopish";

/// Vibration pattern for pushed notifications.
pub const PUSH_VIBRATE: [u32; 3] = [100, 50, 100];

/// A push message delivered by the platform.
#[derive(Debug, Clone, Default)]
pub struct PushEvent {
    pub data: Option<Bytes>,
}

impl PushEvent {
    pub fn new(data: Option<Bytes>) -> Self {
        Self { data }
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            data: Some(Bytes::copy_from_slice(text.as_bytes())),
        }
    }

    /// Payload decoded as text, if any.
    pub fn text(&self) -> Option<String> {
        self.data
            .as_ref()
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }
}

/// Build the notification shown for a push.
pub fn push_notification(config: &PwaConfig, payload: Option<String>, arrived_at_ms: i64) -> Notification {
    let body = payload.unwrap_or_else(|| config.push_default_body.clone());

    Notification::new(&config.app_name, body)
        .icon(&config.icon)
        .badge(&config.icon)
        .vibrate(&PUSH_VIBRATE)
        .data(NotificationData {
            date_of_arrival: arrived_at_ms,
            primary_key: 1,
        })
        .action(NotificationAction {
            action: ACTION_EXPLORE.to_string(),
            title: EXPLORE_LABEL.to_string(),
            icon: Some(config.icon.clone()),
        })
        .action(NotificationAction {
            action: ACTION_CLOSE.to_string(),
            title: CLOSE_LABEL.to_string(),
            icon: Some(config.icon.clone()),
        })
}

/// A notification currently on screen.
#[derive(Debug, Clone)]
pub struct DisplayedNotification {
    pub notification: Notification,
    closed: bool,
}

impl DisplayedNotification {
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            closed: false,
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// What the user clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Explore,
    Close,
    /// The notification body, or an action id we do not know.
    Body,
}

impl ClickTarget {
    pub fn from_action(action: Option<&str>) -> Self {
        match action {
            Some(ACTION_EXPLORE) => ClickTarget::Explore,
            Some(ACTION_CLOSE) => ClickTarget::Close,
            _ => ClickTarget::Body,
        }
    }
}

/// A click on a notification or one of its actions.
#[derive(Debug, Clone)]
pub struct NotificationClickEvent {
    /// Action id, `None` for a click on the body.
    pub action: Option<String>,
    pub notification: DisplayedNotification,
}

impl NotificationClickEvent {
    pub fn new(notification: DisplayedNotification, action: Option<&str>) -> Self {
        Self {
            action: action.map(str::to_string),
            notification,
        }
    }

    pub fn target(&self) -> ClickTarget {
        ClickTarget::from_action(self.action.as_deref())
    }
}
