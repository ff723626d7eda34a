use std::sync::Arc;

use shared::error::ConfigError;
use tracing::warn;

pub mod config;
pub mod controller;
pub mod image_source;
pub mod session;
pub mod style_transfer;

pub use config::{load_settings, load_settings_from, FirebaseConfig, Settings};
pub use controller::{GenerateOutcome, Phase, RejectReason, ViewController, ViewState};
pub use session::{
    CredentialPrompt, FirebaseIdentityProvider, IdentityProvider, MissingIdentityProvider,
    PresetCredential,
};
pub use style_transfer::{HttpStyleTransfer, StyleTransferService};

/// Wires the HTTP adapter and the Firebase provider from `settings`.
///
/// With `require_identity` unset, an incomplete provider config degrades to
/// `MissingIdentityProvider` so generation still works signed out.
pub fn build_controller(
    settings: &Settings,
    prompt: Arc<dyn CredentialPrompt>,
    require_identity: bool,
) -> Result<Arc<ViewController>, ConfigError> {
    let identity: Arc<dyn IdentityProvider> = match FirebaseIdentityProvider::new(settings, prompt)
    {
        Ok(provider) => Arc::new(provider),
        Err(err) if !require_identity => {
            warn!("identity provider unavailable: {err}");
            Arc::new(MissingIdentityProvider)
        }
        Err(err) => return Err(err),
    };
    let transfer = Arc::new(HttpStyleTransfer::from_settings(settings));
    Ok(ViewController::new(identity, transfer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::AuthError;

    #[tokio::test]
    async fn incomplete_identity_config_degrades_when_optional() {
        let controller = build_controller(&Settings::default(), PresetCredential::new(), false)
            .expect("controller");
        assert_eq!(controller.sign_in().await, Err(AuthError::Unavailable));
    }

    #[test]
    fn incomplete_identity_config_fails_when_required() {
        let err = build_controller(&Settings::default(), PresetCredential::new(), true)
            .err()
            .expect("must fail");
        assert!(matches!(err, ConfigError::MissingField(_)));
    }
}
