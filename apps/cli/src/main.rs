use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{build_controller, load_settings, CredentialPrompt, GenerateOutcome};
use shared::{
    domain::{ImageRef, StyleName},
    error::AuthError,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "artify", about = "Apply AI art styles to your images")]
struct Cli {
    /// TOML settings file (defaults to ./artify.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the style transfer service base URL.
    #[arg(long, global = true)]
    service_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available styles.
    Styles,
    /// Print the effective settings with secrets masked.
    Config,
    /// Sign in with the identity provider.
    Login,
    /// Stylize an image and print the resulting reference.
    Generate {
        #[arg(long, conflicts_with = "image_url", required_unless_present = "image_url")]
        image: Option<PathBuf>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long, default_value_t = StyleName::default())]
        style: StyleName,
        /// Sign in before generating.
        #[arg(long)]
        login: bool,
    },
}

/// Prints the authorization URL and reads the resulting ID token from stdin.
struct StdinPrompt;

#[async_trait]
impl CredentialPrompt for StdinPrompt {
    async fn obtain_id_token(&self, authorize_url: &str) -> Result<String, AuthError> {
        eprintln!("Open this URL to sign in with Google:\n  {authorize_url}");
        eprintln!("Paste the ID token (empty line cancels):");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        let token = line.trim();
        if token.is_empty() {
            return Err(AuthError::Cancelled);
        }
        Ok(token.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings =
        load_settings(cli.config.as_deref()).context("failed to load artify settings")?;
    if let Some(service_url) = cli.service_url {
        settings.service_url = service_url;
    }

    match cli.command {
        Command::Styles => {
            for style in StyleName::ALL {
                println!("{style}");
            }
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
        }
        Command::Login => {
            let controller = build_controller(&settings, Arc::new(StdinPrompt), true)
                .context("identity provider initialization failed")?;
            let session = controller
                .sign_in()
                .await
                .map_err(|err| anyhow!(err).context("login failed"))?;
            println!("Hi, {}", session.display_name);
        }
        Command::Generate {
            image,
            image_url,
            style,
            login,
        } => {
            let controller = build_controller(&settings, Arc::new(StdinPrompt), login)
                .context("identity provider initialization failed")?;
            let renderer = render::spawn_renderer(controller.subscribe());

            if login {
                // A failed sign-in is logged by the controller; generation proceeds signed out.
                let _ = controller.sign_in().await;
            }

            match (image, image_url) {
                (Some(path), _) => {
                    controller
                        .select_file(&path)
                        .with_context(|| format!("cannot use '{}'", path.display()))?;
                }
                (None, Some(url)) => controller.set_input_image(ImageRef::remote(url)),
                (None, None) => bail!("either --image or --image-url is required"),
            }
            controller.select_style(style);

            let outcome = controller.generate().await;
            // Closing the watch channel ends the renderer after its last snapshot.
            drop(controller);
            let _ = renderer.await;

            match outcome {
                GenerateOutcome::Completed(output) => println!("{output}"),
                GenerateOutcome::Failed(err) => {
                    return Err(anyhow!(err).context("style transfer failed"));
                }
                GenerateOutcome::Rejected(reason) => bail!("generate rejected: {reason:?}"),
            }
        }
    }

    Ok(())
}
