//! Backend commands queued from UI to backend worker.

use shared::domain::StyleName;
use std::path::PathBuf;

#[derive(Debug)]
pub enum BackendCommand {
    SignIn { id_token: String },
    SignOut,
    SelectFile { path: PathBuf },
    SelectStyle { style: StyleName },
    Generate,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::SignIn { .. } => "sign_in",
            BackendCommand::SignOut => "sign_out",
            BackendCommand::SelectFile { .. } => "select_file",
            BackendCommand::SelectStyle { .. } => "select_style",
            BackendCommand::Generate => "generate",
        }
    }
}
