//! View state machine: `Idle` -> `Ready` -> `Generating` -> `Ready`.
//!
//! State lives in a `watch` channel. Front ends read `snapshot()` or hold a receiver from
//! `subscribe()` and re-render on change.

use std::{path::Path, sync::Arc};

use shared::{
    domain::{ImageRef, Session, StyleName},
    error::{AuthError, ImageSourceError, TransferError},
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{image_source, session::IdentityProvider, style_transfer::StyleTransferService};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub session: Option<Session>,
    pub input_image: Option<ImageRef>,
    pub selected_style: StyleName,
    pub output_image: Option<ImageRef>,
    pub is_generating: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Ready,
    Generating,
}

impl ViewState {
    pub fn phase(&self) -> Phase {
        if self.is_generating {
            Phase::Generating
        } else if self.input_image.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub fn can_generate(&self) -> bool {
        self.phase() == Phase::Ready
    }

    /// Output is hidden while a new attempt is pending.
    pub fn visible_output(&self) -> Option<&ImageRef> {
        if self.is_generating {
            None
        } else {
            self.output_image.as_ref()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoInput,
    AlreadyGenerating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Completed(ImageRef),
    Failed(TransferError),
    Rejected(RejectReason),
}

pub struct ViewController {
    identity: Arc<dyn IdentityProvider>,
    transfer: Arc<dyn StyleTransferService>,
    state: watch::Sender<ViewState>,
}

// Clears `is_generating` if a generate future is dropped before it resolves.
struct GeneratingGuard<'a> {
    state: &'a watch::Sender<ViewState>,
    armed: bool,
}

impl GeneratingGuard<'_> {
    fn finish(mut self, output: Option<ImageRef>) {
        self.armed = false;
        self.state.send_modify(|state| {
            if let Some(output) = output {
                state.output_image = Some(output);
            }
            state.is_generating = false;
        });
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|state| state.is_generating = false);
        }
    }
}

impl ViewController {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        transfer: Arc<dyn StyleTransferService>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(ViewState::default());
        Arc::new(Self {
            identity,
            transfer,
            state,
        })
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn select_file(&self, path: impl AsRef<Path>) -> Result<ImageRef, ImageSourceError> {
        let image = image_source::load_local_image(path)?;
        self.set_input_image(image.clone());
        Ok(image)
    }

    /// Replaces the input; allowed in any phase. An in-flight transfer keeps the
    /// reference it started with.
    pub fn set_input_image(&self, image: ImageRef) {
        info!(image = %image, "input image selected");
        self.state
            .send_modify(|state| state.input_image = Some(image));
    }

    pub fn select_style(&self, style: StyleName) {
        self.state.send_if_modified(|state| {
            if state.selected_style == style {
                return false;
            }
            state.selected_style = style;
            true
        });
    }

    pub async fn generate(&self) -> GenerateOutcome {
        let mut claim = Err(RejectReason::NoInput);
        self.state.send_if_modified(|state| {
            if state.is_generating {
                claim = Err(RejectReason::AlreadyGenerating);
                return false;
            }
            match &state.input_image {
                Some(image) => {
                    claim = Ok((image.clone(), state.selected_style));
                    state.is_generating = true;
                    true
                }
                None => false,
            }
        });

        let (image, style) = match claim {
            Ok(claimed) => claimed,
            Err(reason) => {
                info!(?reason, "generate ignored");
                return GenerateOutcome::Rejected(reason);
            }
        };

        let guard = GeneratingGuard {
            state: &self.state,
            armed: true,
        };
        info!(image = %image, %style, "style transfer started");
        match self.transfer.transfer(&image, style).await {
            Ok(output) => {
                info!(output = %output, "style transfer finished");
                guard.finish(Some(output.clone()));
                GenerateOutcome::Completed(output)
            }
            Err(err) => {
                warn!("Style transfer failed: {err}");
                guard.finish(None);
                GenerateOutcome::Failed(err)
            }
        }
    }

    pub async fn sign_in(&self) -> Result<Session, AuthError> {
        match self.identity.authenticate().await {
            Ok(session) => {
                info!(display_name = %session.display_name, "signed in");
                self.state
                    .send_modify(|state| state.session = Some(session.clone()));
                Ok(session)
            }
            Err(err) => {
                warn!("Login failed: {err}");
                Err(err)
            }
        }
    }

    pub async fn sign_out(&self) {
        if let Err(err) = self.identity.deauthenticate().await {
            warn!("identity provider sign-out reported an error: {err}");
        }
        self.state.send_modify(|state| state.session = None);
        info!("signed out");
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
