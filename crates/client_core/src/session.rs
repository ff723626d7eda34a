use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::Session,
    error::{AuthError, ConfigError},
    protocol::{IdentityErrorEnvelope, SignInWithIdpRequest, SignInWithIdpResponse},
};
use tracing::info;
use url::{form_urlencoded, Url};

use crate::config::{FirebaseConfig, Settings};

const GOOGLE_PROVIDER_ID: &str = "google.com";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self) -> Result<Session, AuthError>;
    async fn deauthenticate(&self) -> Result<(), AuthError>;
}

/// The interactive half of sign-in: given the provider's authorization URL, hand
/// back an IdP ID token, or `AuthError::Cancelled`.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    async fn obtain_id_token(&self, authorize_url: &str) -> Result<String, AuthError>;
}

pub struct MissingIdentityProvider;

#[async_trait]
impl IdentityProvider for MissingIdentityProvider {
    async fn authenticate(&self) -> Result<Session, AuthError> {
        Err(AuthError::Unavailable)
    }

    async fn deauthenticate(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Prompt fed from outside: a front end stores a pasted token before calling sign-in.
/// Each token is consumed by one attempt; an empty slot reads as a cancellation.
#[derive(Default)]
pub struct PresetCredential {
    token: Mutex<Option<String>>,
}

impl PresetCredential {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = (!token.trim().is_empty()).then(|| token.trim().to_string());
    }

    fn take(&self) -> Option<String> {
        match self.token.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

#[async_trait]
impl CredentialPrompt for PresetCredential {
    async fn obtain_id_token(&self, _authorize_url: &str) -> Result<String, AuthError> {
        self.take().ok_or(AuthError::Cancelled)
    }
}

pub struct FirebaseIdentityProvider {
    http: Client,
    sign_in_url: Url,
    authorize_url: Url,
    request_uri: String,
    prompt: Arc<dyn CredentialPrompt>,
}

impl FirebaseIdentityProvider {
    pub fn new(
        settings: &Settings,
        prompt: Arc<dyn CredentialPrompt>,
    ) -> Result<Self, ConfigError> {
        let firebase = &settings.firebase;
        firebase.validate()?;

        let mut sign_in_url = Url::parse(&format!(
            "{}/v1/accounts:signInWithIdp",
            settings.identity_endpoint.trim_end_matches('/')
        ))
        .map_err(|err| ConfigError::Invalid {
            field: "identity_endpoint",
            message: err.to_string(),
        })?;
        sign_in_url
            .query_pairs_mut()
            .append_pair("key", &firebase.api_key);

        let authorize_url = build_authorize_url(firebase)?;

        Ok(Self {
            http: Client::new(),
            sign_in_url,
            authorize_url,
            request_uri: format!("https://{}", firebase.auth_domain.trim()),
            prompt,
        })
    }

    pub fn authorize_url(&self) -> &str {
        self.authorize_url.as_str()
    }

    async fn exchange(&self, id_token: &str) -> Result<SignInWithIdpResponse, AuthError> {
        let post_body = form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", id_token)
            .append_pair("providerId", GOOGLE_PROVIDER_ID)
            .finish();

        let response = self
            .http
            .post(self.sign_in_url.clone())
            .json(&SignInWithIdpRequest {
                post_body,
                request_uri: self.request_uri.clone(),
                return_secure_token: true,
                return_idp_credential: true,
            })
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<IdentityErrorEnvelope>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(AuthError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<SignInWithIdpResponse>()
            .await
            .map_err(|err| AuthError::MalformedResponse(err.to_string()))
    }
}

fn build_authorize_url(firebase: &FirebaseConfig) -> Result<Url, ConfigError> {
    let mut url = Url::parse(&format!(
        "https://{}/__/auth/handler",
        firebase.auth_domain.trim()
    ))
    .map_err(|err| ConfigError::Invalid {
        field: "firebase.auth_domain",
        message: err.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("apiKey", &firebase.api_key)
        .append_pair("appName", "[DEFAULT]")
        .append_pair("authType", "signInViaPopup")
        .append_pair("providerId", GOOGLE_PROVIDER_ID);
    Ok(url)
}

fn session_from_response(body: SignInWithIdpResponse) -> Session {
    let display_name = body
        .display_name
        .filter(|name| !name.trim().is_empty())
        .or_else(|| body.email.filter(|email| !email.trim().is_empty()))
        .unwrap_or_else(|| "Anonymous".to_string());
    Session {
        display_name,
        local_id: Some(body.local_id),
        id_token: body.id_token,
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn authenticate(&self) -> Result<Session, AuthError> {
        let id_token = self.prompt.obtain_id_token(self.authorize_url()).await?;
        let body = self.exchange(&id_token).await?;
        let session = session_from_response(body);
        info!(display_name = %session.display_name, "identity provider sign-in succeeded");
        Ok(session)
    }

    async fn deauthenticate(&self) -> Result<(), AuthError> {
        // Tokens are held only in memory; nothing to revoke remotely.
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
