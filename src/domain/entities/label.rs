//! # Label
//!
//! Shipping label, inline or hosted.

use crate::domain::value_objects::enums::LabelFormat;
use crate::domain::value_objects::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// A shipping label.
///
/// Exactly one of `data` (base64 document) or `url` is normally set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Label {
    /// Document format.
    pub format: LabelFormat,
    /// Base64-encoded document.
    pub data: Option<String>,
    /// Hosted document.
    pub url: Option<String>,
    /// When a hosted document stops being available.
    pub expires_at: Option<Timestamp>,
}

impl Label {
    /// Creates an inline label from base64 data.
    #[must_use]
    pub fn inline(format: LabelFormat, data: impl Into<String>) -> Self {
        Self {
            format,
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Creates a hosted label.
    #[must_use]
    pub fn hosted(format: LabelFormat, url: impl Into<String>) -> Self {
        Self {
            format,
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Returns true if the label carries inline data.
    #[inline]
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.data.as_deref().is_some_and(|d| !d.is_empty())
    }
}
