//! Terminal rendering of controller snapshots.

use client_core::{Phase, ViewState};
use tokio::{sync::watch, task::JoinHandle};

/// Lines to print when the view moves from `prev` to `next`.
pub fn describe_transition(prev: &ViewState, next: &ViewState) -> Vec<String> {
    let mut lines = Vec::new();

    match (&prev.session, &next.session) {
        (None, Some(session)) => lines.push(format!("Hi, {}", session.display_name)),
        (Some(_), None) => lines.push("Signed out".to_string()),
        _ => {}
    }

    if prev.input_image != next.input_image {
        if let Some(input) = &next.input_image {
            lines.push(format!("Input image: {input}"));
        }
    }

    if prev.selected_style != next.selected_style {
        lines.push(format!("Style: {}", next.selected_style));
    }

    match (prev.phase(), next.phase()) {
        (from, Phase::Generating) if from != Phase::Generating => {
            lines.push("Applying Style...".to_string());
        }
        (Phase::Generating, _) => match next.visible_output() {
            Some(output) if prev.output_image.as_ref() != Some(output) => {
                lines.push(format!("Stylized Output: {output}"));
            }
            _ => lines.push("Generation finished without new output".to_string()),
        },
        _ => {}
    }

    lines
}

pub fn spawn_renderer(mut rx: watch::Receiver<ViewState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            for line in describe_transition(&last, &next) {
                eprintln!("{line}");
            }
            last = next;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{ImageRef, Session, StyleName};

    fn ready() -> ViewState {
        ViewState {
            input_image: Some(ImageRef::remote("https://cdn/in.png")),
            ..ViewState::default()
        }
    }

    #[test]
    fn announces_sign_in_and_out() {
        let signed_in = ViewState {
            session: Some(Session::new("Ada")),
            ..ViewState::default()
        };
        assert_eq!(
            describe_transition(&ViewState::default(), &signed_in),
            vec!["Hi, Ada".to_string()]
        );
        assert_eq!(
            describe_transition(&signed_in, &ViewState::default()),
            vec!["Signed out".to_string()]
        );
    }

    #[test]
    fn announces_generation_lifecycle() {
        let start = ViewState {
            selected_style: StyleName::PixelArt,
            ..ready()
        };
        let generating = ViewState {
            is_generating: true,
            ..start.clone()
        };
        let done = ViewState {
            output_image: Some(ImageRef::remote("https://cdn/x.png")),
            ..start.clone()
        };

        assert_eq!(
            describe_transition(&start, &generating),
            vec!["Applying Style...".to_string()]
        );
        assert_eq!(
            describe_transition(&generating, &done),
            vec!["Stylized Output: https://cdn/x.png".to_string()]
        );
        assert_eq!(
            describe_transition(&generating, &start),
            vec!["Generation finished without new output".to_string()]
        );
    }

    #[test]
    fn style_change_is_reported_alone() {
        let next = ViewState {
            selected_style: StyleName::Cyberpunk,
            ..ready()
        };
        assert_eq!(
            describe_transition(&ready(), &next),
            vec!["Style: Cyberpunk".to_string()]
        );
    }

    #[tokio::test]
    async fn renderer_drains_and_finishes_when_sender_drops() {
        let (tx, rx) = watch::channel(ViewState::default());
        let renderer = spawn_renderer(rx);
        tx.send_replace(ready());
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(1), renderer)
            .await
            .expect("renderer finished")
            .expect("join");
    }
}
