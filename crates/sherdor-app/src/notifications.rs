//! Notification permission handling and local notifications.

use std::sync::Arc;
use std::time::Duration;

use sherdor_core::config::PwaConfig;
use sherdor_core::platform::NotificationPlatform;
use sherdor_core::types::{Notification, Permission};
use tracing::{debug, error, info, warn};

const CONFIRMATION_BODY: &str = "Bildirishnomalar muvaffaqiyatli yoqildi!";
const TEST_TITLE: &str = "Test Bildirishnoma";
const TEST_BODY: &str = "Bu test bildirishnomasi. Tizim to'g'ri ishlayapti!";
const REMINDER_VIBRATE: [u32; 3] = [100, 50, 100];

/// Notification capability as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    /// The host has no notification API. Terminal.
    Unsupported,
    Default,
    Denied,
    Granted,
}

impl NotificationState {
    pub fn from_platform(supported: bool, permission: Permission) -> Self {
        if !supported {
            return NotificationState::Unsupported;
        }
        match permission {
            Permission::Default => NotificationState::Default,
            Permission::Denied => NotificationState::Denied,
            Permission::Granted => NotificationState::Granted,
        }
    }

    pub fn is_granted(&self) -> bool {
        *self == NotificationState::Granted
    }

    /// Status label shown next to the notification settings.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationState::Unsupported => {
                "Sizning brauzeringiz bildirishnomalarni qo'llab-quvvatlamaydi"
            }
            NotificationState::Granted => "Yoqilgan",
            NotificationState::Denied => "O'chirilgan",
            NotificationState::Default => "Aniqlanmagan",
        }
    }
}

/// Side effect produced by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEffect {
    Show(Notification),
}

/// Canned reminders offered on the settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderPreset {
    TenSeconds,
    OneMinute,
}

impl ReminderPreset {
    pub fn title(&self) -> &'static str {
        match self {
            ReminderPreset::TenSeconds => "Test eslatma",
            ReminderPreset::OneMinute => "1 daqiqalik eslatma",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            ReminderPreset::TenSeconds => "Bu 10 soniyadan keyin kelgan eslatma",
            ReminderPreset::OneMinute => "Bu 1 daqiqadan keyin kelgan eslatma",
        }
    }

    pub fn delay_minutes(&self) -> f64 {
        match self {
            ReminderPreset::TenSeconds => 0.17,
            ReminderPreset::OneMinute => 1.0,
        }
    }
}

/// Convert a reminder delay in minutes to a duration.
///
/// Negative and NaN delays fire immediately; delays too large to represent
/// saturate.
pub fn reminder_delay(minutes: f64) -> Duration {
    if minutes.is_nan() || minutes <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(minutes * 60.0).unwrap_or(Duration::MAX)
}

/// Owns the UI's view of notification permission.
pub struct NotificationDispatcher {
    platform: Arc<dyn NotificationPlatform>,
    state: NotificationState,
    app_name: String,
    icon: String,
}

impl NotificationDispatcher {
    /// Mirror the platform's current capability and permission.
    pub fn new(platform: Arc<dyn NotificationPlatform>, config: &PwaConfig) -> Self {
        let state = NotificationState::from_platform(platform.is_supported(), platform.permission());
        debug!(?state, "Notification dispatcher initialised");
        Self {
            platform,
            state,
            app_name: config.app_name.clone(),
            icon: config.icon.clone(),
        }
    }

    pub fn state(&self) -> NotificationState {
        self.state
    }

    /// Record the outcome of a consent flow and return the effects it implies.
    ///
    /// Never leaves `Unsupported`.
    pub fn transition(&mut self, result: Permission) -> Vec<NotificationEffect> {
        if self.state == NotificationState::Unsupported {
            return Vec::new();
        }
        self.state = NotificationState::from_platform(true, result);

        match result {
            Permission::Granted => vec![NotificationEffect::Show(
                Notification::new(&self.app_name, CONFIRMATION_BODY).icon(&self.icon),
            )],
            Permission::Default | Permission::Denied => Vec::new(),
        }
    }

    /// Hand effects to the platform.
    pub fn apply(&self, effects: Vec<NotificationEffect>) {
        for effect in effects {
            match effect {
                NotificationEffect::Show(notification) => self.platform.show(notification),
            }
        }
    }

    /// Ask the user for permission.
    ///
    /// Platform errors are logged and leave the state untouched.
    pub async fn request_permission(&mut self) -> NotificationState {
        if self.state == NotificationState::Unsupported {
            return self.state;
        }

        match self.platform.request_permission().await {
            Ok(result) => {
                info!(permission = %result, "Notification permission answered");
                let effects = self.transition(result);
                self.apply(effects);
            }
            Err(e) => {
                error!(error = %e, "Notification permission error");
            }
        }
        self.state
    }

    /// Show the fixed test notification. Returns whether it was shown.
    pub fn send_test_notification(&self) -> bool {
        if !self.state.is_granted() {
            return false;
        }
        self.platform.show(
            Notification::new(TEST_TITLE, TEST_BODY)
                .icon(&self.icon)
                .badge(&self.icon),
        );
        true
    }

    /// Show a notification after `delay_minutes`.
    ///
    /// Only armed when permission is granted now; the reminder cannot be
    /// cancelled and is lost if the runtime shuts down first. Outside a tokio
    /// runtime nothing is armed. Returns whether the reminder was armed.
    pub fn schedule_reminder(&self, title: &str, body: &str, delay_minutes: f64) -> bool {
        if !self.state.is_granted() {
            debug!(title, "Reminder not scheduled, permission not granted");
            return false;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(title, "Reminder not scheduled, no async runtime");
            return false;
        };

        let delay = reminder_delay(delay_minutes);
        let notification = Notification::new(title, body)
            .icon(&self.icon)
            .badge(&self.icon)
            .vibrate(&REMINDER_VIBRATE);
        let platform = Arc::clone(&self.platform);

        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(title = %notification.title, "Reminder firing");
            platform.show(notification);
        });

        info!(title, ?delay, "Reminder scheduled");
        true
    }

    pub fn schedule_preset(&self, preset: ReminderPreset) -> bool {
        self.schedule_reminder(preset.title(), preset.body(), preset.delay_minutes())
    }
}
