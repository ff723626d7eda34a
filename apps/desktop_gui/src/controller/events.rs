//! Backend-to-UI events and error modeling for the desktop front end.

use client_core::ViewState;
use shared::{
    domain::ImageRef,
    error::{AuthError, ConfigError, ImageSourceError, TransferError},
};
use tokio::sync::watch;

use crate::media::{PreviewImage, PreviewSlot};

pub enum UiEvent {
    /// Backend is up; the UI renders from this receiver from now on.
    Attached {
        view: watch::Receiver<ViewState>,
        authorize_url: Option<String>,
    },
    Info(String),
    Error(UiError),
    PreviewLoaded {
        slot: PreviewSlot,
        image_ref: ImageRef,
        preview: PreviewImage,
    },
    PreviewFailed {
        slot: PreviewSlot,
        image_ref: ImageRef,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    SignIn,
    SelectFile,
    Generate,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_auth(err: &AuthError) -> Self {
        let category = match err {
            AuthError::Cancelled | AuthError::Provider { .. } => UiErrorCategory::Auth,
            AuthError::Unavailable => UiErrorCategory::Config,
            AuthError::Transport(_) => UiErrorCategory::Transport,
            AuthError::MalformedResponse(_) => UiErrorCategory::Validation,
        };
        Self::new(category, UiErrorContext::SignIn, err.to_string())
    }

    pub fn from_transfer(err: &TransferError) -> Self {
        let category = match err {
            TransferError::Malformed(_) => UiErrorCategory::Validation,
            TransferError::Network(_) | TransferError::Status { .. } | TransferError::Timeout => {
                UiErrorCategory::Transport
            }
        };
        Self::new(category, UiErrorContext::Generate, err.to_string())
    }

    pub fn from_image_source(err: &ImageSourceError) -> Self {
        Self::new(
            UiErrorCategory::Validation,
            UiErrorContext::SelectFile,
            err.to_string(),
        )
    }

    pub fn from_config(err: &ConfigError) -> Self {
        Self::new(
            UiErrorCategory::Config,
            UiErrorContext::BackendStartup,
            err.to_string(),
        )
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth && self.context == UiErrorContext::SignIn
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-line status text.
    pub fn status_line(&self) -> String {
        let prefix = match self.context {
            UiErrorContext::BackendStartup => "Startup",
            UiErrorContext::SignIn => "Login failed",
            UiErrorContext::SelectFile => "Cannot use file",
            UiErrorContext::Generate => "Style transfer failed",
        };
        format!("{prefix}: {}", self.message)
    }
}
