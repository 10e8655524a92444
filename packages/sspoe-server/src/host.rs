//! Host adapter for browser clients driving the player over HTTP.
//!
//! Nothing is painted server side: side effects are buffered and handed back
//! to the client with the view it must render.

use serde::Serialize;
use sspoe_core::controller::{Host, HostError};
use sspoe_core::view::ViewDescriptor;
use sspoe_core::{Language, TextDirection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEffect {
    SetDocumentLanguage { lang: Language, dir: TextDirection },
    RequestFullscreen,
    ExitFullscreen,
    ShowInstallPrompt,
}

/// The client keeps the real deferred `beforeinstallprompt` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredPrompt;

#[derive(Debug, Default)]
pub struct BufferedHost {
    effects: Vec<HostEffect>,
}

impl BufferedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<HostEffect> {
        std::mem::take(&mut self.effects)
    }
}

impl Host for BufferedHost {
    type InstallPrompt = DeferredPrompt;

    fn render(&mut self, view: &ViewDescriptor) {
        tracing::trace!(view = ?view.kind(), "view invalidated");
    }

    fn set_document_language(&mut self, lang: Language, dir: TextDirection) {
        self.effects
            .push(HostEffect::SetDocumentLanguage { lang, dir });
    }

    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        self.effects.push(HostEffect::RequestFullscreen);
        Ok(())
    }

    fn exit_fullscreen(&mut self) {
        self.effects.push(HostEffect::ExitFullscreen);
    }

    fn show_install_prompt(&mut self, _prompt: DeferredPrompt) {
        self.effects.push(HostEffect::ShowInstallPrompt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_buffer() {
        let mut host = BufferedHost::new();
        host.set_document_language(Language::Ar, TextDirection::Rtl);
        host.request_fullscreen().unwrap();

        let effects = host.drain();
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[1], HostEffect::RequestFullscreen);
        assert!(host.drain().is_empty());
    }

    #[test]
    fn test_effect_serialization() {
        let effect = HostEffect::SetDocumentLanguage {
            lang: Language::Ar,
            dir: TextDirection::Rtl,
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "setDocumentLanguage", "lang": "ar", "dir": "rtl"})
        );
    }
}
