use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownStyle;

macro_rules! ref_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// Opaque handle to image bytes: a local file URL or a remote URL, never the bytes.
ref_newtype!(ImageRef);

impl ImageRef {
    pub fn remote(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn is_local(&self) -> bool {
        self.0.starts_with("file:")
    }
}

/// Authenticated identity held client-side. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub display_name: String,
    pub local_id: Option<String>,
    pub id_token: Option<String>,
}

impl Session {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            local_id: None,
            id_token: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StyleName {
    #[default]
    #[serde(rename = "Van Gogh")]
    VanGogh,
    #[serde(rename = "Cyberpunk")]
    Cyberpunk,
    #[serde(rename = "Studio Ghibli")]
    StudioGhibli,
    #[serde(rename = "Pixel Art")]
    PixelArt,
}

impl StyleName {
    pub const ALL: [StyleName; 4] = [
        StyleName::VanGogh,
        StyleName::Cyberpunk,
        StyleName::StudioGhibli,
        StyleName::PixelArt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StyleName::VanGogh => "Van Gogh",
            StyleName::Cyberpunk => "Cyberpunk",
            StyleName::StudioGhibli => "Studio Ghibli",
            StyleName::PixelArt => "Pixel Art",
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StyleName {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}
