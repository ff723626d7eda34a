//! Backend worker: owns the tokio runtime and the view controller.

use std::{sync::Arc, thread};

use client_core::{
    FirebaseIdentityProvider, GenerateOutcome, HttpStyleTransfer, IdentityProvider,
    MissingIdentityProvider, PresetCredential, Settings, ViewController,
};
use crossbeam_channel::{Receiver, Sender};
use reqwest::Client as HttpClient;
use shared::domain::ImageRef;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
use crate::media::{self, PreviewSlot};

async fn send_preview(
    http: HttpClient,
    slot: PreviewSlot,
    image_ref: ImageRef,
    ui_tx: Sender<UiEvent>,
) {
    let event = match media::load_preview(&http, &image_ref).await {
        Ok(preview) => UiEvent::PreviewLoaded {
            slot,
            image_ref,
            preview,
        },
        Err(reason) => {
            tracing::warn!(?slot, image = %image_ref, "preview unavailable: {reason}");
            UiEvent::PreviewFailed {
                slot,
                image_ref,
                reason,
            }
        }
    };
    let _ = ui_tx.try_send(event);
}

pub fn spawn_backend_thread(
    settings: Settings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorCategory::Config,
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let http = HttpClient::new();
        let credential = PresetCredential::new();
        let (identity, authorize_url): (Arc<dyn IdentityProvider>, Option<String>) =
            match FirebaseIdentityProvider::new(&settings, credential.clone()) {
                Ok(provider) => {
                    let url = provider.authorize_url().to_string();
                    (Arc::new(provider), Some(url))
                }
                Err(err) => {
                    tracing::warn!("identity provider initialization failed: {err}");
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_config(&err)));
                    (Arc::new(MissingIdentityProvider), None)
                }
            };

        let controller =
            ViewController::new(identity, Arc::new(HttpStyleTransfer::from_settings(&settings)));
        let _ = ui_tx.try_send(UiEvent::Attached {
            view: controller.subscribe(),
            authorize_url,
        });
        tracing::info!(service_url = %settings.service_url, "backend worker ready");

        // Blocking receive on this thread; async work goes to the runtime so a slow
        // transfer never stalls sign-in or file selection.
        while let Ok(cmd) = cmd_rx.recv() {
            let controller = Arc::clone(&controller);
            let ui_tx = ui_tx.clone();
            match cmd {
                BackendCommand::SignIn { id_token } => {
                    credential.set(id_token);
                    runtime.spawn(async move {
                        match controller.sign_in().await {
                            Ok(session) => {
                                let _ = ui_tx.try_send(UiEvent::Info(format!(
                                    "Signed in as {}",
                                    session.display_name
                                )));
                            }
                            Err(err) => {
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_auth(&err)));
                            }
                        }
                    });
                }
                BackendCommand::SignOut => {
                    runtime.spawn(async move {
                        controller.sign_out().await;
                        let _ = ui_tx.try_send(UiEvent::Info("Signed out".to_string()));
                    });
                }
                BackendCommand::SelectFile { path } => match controller.select_file(&path) {
                    Ok(image_ref) => {
                        runtime.spawn(send_preview(
                            http.clone(),
                            PreviewSlot::Input,
                            image_ref,
                            ui_tx,
                        ));
                    }
                    Err(err) => {
                        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_image_source(&err)));
                    }
                },
                BackendCommand::SelectStyle { style } => controller.select_style(style),
                BackendCommand::Generate => {
                    let http = http.clone();
                    runtime.spawn(async move {
                        match controller.generate().await {
                            GenerateOutcome::Completed(output) => {
                                let _ = ui_tx.try_send(UiEvent::Info(
                                    "Stylized output ready".to_string(),
                                ));
                                send_preview(http, PreviewSlot::Output, output, ui_tx).await;
                            }
                            GenerateOutcome::Failed(err) => {
                                let _ =
                                    ui_tx.try_send(UiEvent::Error(UiError::from_transfer(&err)));
                            }
                            GenerateOutcome::Rejected(reason) => {
                                tracing::debug!(?reason, "generate ignored by controller");
                            }
                        }
                    });
                }
            }
        }
        tracing::info!("ui command channel closed; backend worker exiting");
    });
}
