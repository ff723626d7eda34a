use serde::{Deserialize, Serialize};

use crate::domain::{ImageRef, StyleName};

/// Body of `POST /style-transfer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTransferRequest {
    pub image_url: ImageRef,
    pub style: StyleName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTransferResponse {
    pub stylized_image_url: ImageRef,
}

/// Body of the identity toolkit `accounts:signInWithIdp` exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpRequest {
    pub post_body: String,
    pub request_uri: String,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub local_id: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityErrorEnvelope {
    pub error: IdentityErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
}
