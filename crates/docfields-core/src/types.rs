//! Domain types: accepted media types and extracted invoice fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reply key for the company tax id.
pub const CNPJ_KEY: &str = "CNPJ";
/// Reply key for the postal code.
pub const CEP_KEY: &str = "CEP";
/// Reply key for the issue date.
pub const ISSUE_DATE_KEY: &str = "Data de emissão";
/// Reply key for the total value.
pub const TOTAL_VALUE_KEY: &str = "Valor total";

/// Column widths of the `extracted_data` table.
pub const CNPJ_MAX_LEN: usize = 18;
pub const CEP_MAX_LEN: usize = 9;
pub const ISSUE_DATE_MAX_LEN: usize = 19;
pub const TOTAL_VALUE_MAX_LEN: usize = 50;

/// Upload media types accepted by the extraction endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "application/pdf")]
    Pdf,
}

impl MediaType {
    /// All accepted media types.
    pub const ACCEPTED: [MediaType; 3] = [MediaType::Jpeg, MediaType::Png, MediaType::Pdf];

    /// Parse a declared content type.
    ///
    /// Only the MIME essence is compared (parameters after `;` are ignored),
    /// case-insensitively.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        Self::ACCEPTED
            .into_iter()
            .find(|media| media.as_mime() == essence)
    }

    /// Canonical MIME string.
    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Pdf => "application/pdf",
        }
    }

    /// Whether this media type is forwarded to the model as image bytes.
    pub fn is_image(&self) -> bool {
        matches!(self, MediaType::Jpeg | MediaType::Png)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

/// The four fields read from a model reply.
///
/// Serializes with the exact reply keys, which is also the response body
/// returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedFields {
    /// Company tax id, formatted XX.XXX.XXX/XXXX-XX.
    #[serde(rename = "CNPJ")]
    pub cnpj: String,
    /// Postal code, formatted XXXXX-XXX.
    #[serde(rename = "CEP")]
    pub cep: String,
    /// Issue date as free text.
    #[serde(rename = "Data de emissão")]
    pub issue_date: String,
    /// Total value as currency text.
    #[serde(rename = "Valor total")]
    pub total_value: String,
}

/// A persisted extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Store-assigned id.
    pub id: i64,
    /// The persisted fields.
    #[serde(flatten)]
    pub fields: ExtractedFields,
    /// Insert time, set by the store.
    pub created_at: DateTime<Utc>,
}
