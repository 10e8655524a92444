//! Install prompt flow
//!
//! The host suppresses its native install prompt and hands the deferred
//! handle over. The banner is shown while a prompt is available and the app
//! is not installed; a dismissed prompt leaves the banner as it was.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

#[derive(Debug)]
pub struct InstallFlow<P> {
    deferred: Option<P>,
    banner_visible: bool,
    installed: bool,
}

impl<P> Default for InstallFlow<P> {
    fn default() -> Self {
        Self {
            deferred: None,
            banner_visible: false,
            installed: false,
        }
    }
}

impl<P> InstallFlow<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn banner_visible(&self) -> bool {
        self.banner_visible
    }

    pub fn prompt_available(&self) -> bool {
        self.deferred.is_some()
    }

    pub fn installed(&self) -> bool {
        self.installed
    }

    /// The host offered an install prompt and deferred it.
    pub fn on_prompt_available(&mut self, prompt: P) -> bool {
        if self.installed {
            return false;
        }
        self.deferred = Some(prompt);
        self.banner_visible = true;
        true
    }

    /// Hands the deferred prompt to the host. A prompt is shown at most once.
    pub fn take_prompt(&mut self) -> Option<P> {
        self.deferred.take()
    }

    /// Records the learner's answer to the prompt. Returns whether the banner
    /// visibility changed.
    pub fn on_outcome(&mut self, outcome: InstallOutcome) -> bool {
        match outcome {
            InstallOutcome::Accepted => {
                let changed = self.banner_visible;
                self.banner_visible = false;
                changed
            }
            InstallOutcome::Dismissed => false,
        }
    }

    pub fn on_installed(&mut self) -> bool {
        let changed = self.banner_visible || !self.installed;
        self.installed = true;
        self.deferred = None;
        self.banner_visible = false;
        changed
    }
}
