//! Download names for watermarked reports.
//!
//! A report reaches its reader through one of three routes and the served
//! file is named after the route, so a leaked copy also tells which channel
//! it came from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the reader obtained the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    /// Authenticated user viewing the report.
    View,
    /// External reader through a credentialed share link.
    Shared,
    /// Special access token without credentials.
    Special,
}

impl DeliveryKind {
    /// Filename suffix for this route.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::View => "watermark",
            Self::Shared => "compartilhado",
            Self::Special => "especial",
        }
    }
}

impl fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::View => "view",
            Self::Shared => "shared",
            Self::Special => "special",
        };
        f.write_str(name)
    }
}

impl FromStr for DeliveryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "shared" => Ok(Self::Shared),
            "special" => Ok(Self::Special),
            other => Err(format!(
                "unknown delivery kind '{}', expected view, shared or special",
                other
            )),
        }
    }
}

/// Build the served filename, e.g. `relatorio_012-2024_compartilhado.pdf`.
///
/// Characters outside `[A-Za-z0-9_-]` in the report number become `-`, so
/// "012/2024" cannot escape the output directory.
pub fn download_filename(report_number: &str, kind: DeliveryKind) -> String {
    let number: String = report_number
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    format!("relatorio_{}_{}.pdf", number, kind.suffix())
}
