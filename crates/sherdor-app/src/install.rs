//! Deferred install prompt handling.

use std::sync::Arc;

use sherdor_core::error::{SherdorError, SherdorResult};
use sherdor_core::platform::DeferredPrompt;
use sherdor_core::types::InstallOutcome;
use tracing::{debug, info, warn};

/// The platform's "before install prompt" signal.
pub struct BeforeInstallPromptEvent {
    prompt: Arc<dyn DeferredPrompt>,
    default_prevented: bool,
}

impl BeforeInstallPromptEvent {
    pub fn new(prompt: Arc<dyn DeferredPrompt>) -> Self {
        Self {
            prompt,
            default_prevented: false,
        }
    }

    /// Suppress the platform's own install banner.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Holds at most one deferred prompt until the user installs.
#[derive(Default)]
pub struct InstallPromptManager {
    deferred: Option<Arc<dyn DeferredPrompt>>,
    installable: bool,
}

impl InstallPromptManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installable(&self) -> bool {
        self.installable
    }

    pub fn has_deferred_prompt(&self) -> bool {
        self.deferred.is_some()
    }

    /// Capture the prompt carried by `event`.
    ///
    /// The platform banner is suppressed either way. A second prompt while
    /// one is outstanding is rejected; call [`discard`](Self::discard) first.
    pub fn on_before_install_prompt(
        &mut self,
        event: &mut BeforeInstallPromptEvent,
    ) -> SherdorResult<()> {
        event.prevent_default();

        if self.deferred.is_some() {
            warn!("Install prompt already captured, ignoring new one");
            return Err(SherdorError::invalid_state(
                "an install prompt is already outstanding",
            ));
        }

        self.deferred = Some(Arc::clone(&event.prompt));
        self.installable = true;
        debug!("Install prompt captured");
        Ok(())
    }

    /// Drop the outstanding prompt without showing it.
    pub fn discard(&mut self) -> bool {
        self.installable = false;
        self.deferred.take().is_some()
    }

    /// Show the stored prompt and wait for the user's choice.
    ///
    /// Returns `None` when there is nothing to show. A dismissed prompt stays
    /// stored and can be shown again.
    pub async fn install(&mut self) -> SherdorResult<Option<InstallOutcome>> {
        let Some(prompt) = self.deferred.clone() else {
            return Ok(None);
        };

        let outcome = prompt.prompt().await?;
        info!(?outcome, "Install prompt answered");

        if outcome == InstallOutcome::Accepted {
            self.installable = false;
            self.deferred = None;
        }
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakePrompt {
        outcome: InstallOutcome,
        shown: AtomicUsize,
    }

    impl FakePrompt {
        fn new(outcome: InstallOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                shown: AtomicUsize::new(0),
            })
        }

        fn shown(&self) -> usize {
            self.shown.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DeferredPrompt for FakePrompt {
        async fn prompt(&self) -> SherdorResult<InstallOutcome> {
            self.shown.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome)
        }
    }

    fn capture(manager: &mut InstallPromptManager, prompt: &Arc<FakePrompt>) -> SherdorResult<()> {
        let mut event = BeforeInstallPromptEvent::new(prompt.clone());
        let result = manager.on_before_install_prompt(&mut event);
        assert!(event.default_prevented());
        result
    }

    #[tokio::test]
    async fn test_install_without_prompt_is_noop() {
        let mut manager = InstallPromptManager::new();
        assert!(!manager.is_installable());
        assert_eq!(manager.install().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_accepted_install_clears_prompt() {
        let prompt = FakePrompt::new(InstallOutcome::Accepted);
        let mut manager = InstallPromptManager::new();
        capture(&mut manager, &prompt).unwrap();
        assert!(manager.is_installable());

        assert_eq!(
            manager.install().await.unwrap(),
            Some(InstallOutcome::Accepted)
        );
        assert!(!manager.is_installable());
        assert!(!manager.has_deferred_prompt());

        // Consumed: a second install does nothing.
        assert_eq!(manager.install().await.unwrap(), None);
        assert_eq!(prompt.shown(), 1);
    }

    #[tokio::test]
    async fn test_dismissed_install_keeps_prompt() {
        let prompt = FakePrompt::new(InstallOutcome::Dismissed);
        let mut manager = InstallPromptManager::new();
        capture(&mut manager, &prompt).unwrap();

        assert_eq!(
            manager.install().await.unwrap(),
            Some(InstallOutcome::Dismissed)
        );
        assert!(manager.is_installable());
        assert!(manager.has_deferred_prompt());

        manager.install().await.unwrap();
        assert_eq!(prompt.shown(), 2);
    }

    #[test]
    fn test_second_capture_rejected_until_discarded() {
        let first = FakePrompt::new(InstallOutcome::Accepted);
        let second = FakePrompt::new(InstallOutcome::Accepted);
        let mut manager = InstallPromptManager::new();

        capture(&mut manager, &first).unwrap();
        assert!(matches!(
            capture(&mut manager, &second),
            Err(SherdorError::InvalidState(_))
        ));

        assert!(manager.discard());
        assert!(!manager.is_installable());
        capture(&mut manager, &second).unwrap();
        assert!(manager.is_installable());
    }
}
