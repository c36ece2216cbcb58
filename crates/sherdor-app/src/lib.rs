//! Sherdor App
//!
//! The UI-context half of the Sherdor PWA: notification permission and local
//! reminders, the deferred install prompt, and the report page statistics.
//! Each piece is driven through the capability traits in `sherdor_core::platform`.

pub mod install;
pub mod notifications;
pub mod stats;

pub use install::{BeforeInstallPromptEvent, InstallPromptManager};
pub use notifications::{
    NotificationDispatcher, NotificationEffect, NotificationState, ReminderPreset,
};
pub use stats::{StatCard, StatsAggregator, StatsSnapshot, StatsView};
