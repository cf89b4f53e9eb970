//! Last-modified markers
//!
//! A marker is the store's opaque change indicator, echoed back on the next
//! conditional fetch. Markers coming from the store are taken verbatim;
//! markers supplied by the user at construction time must be well-formed
//! HTTP dates.

use std::fmt;

use chrono::DateTime;

use crate::error::ConfigError;

/// Opaque last-modification marker returned by the blob store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(String);

impl Marker {
    /// Validates and wraps a user-supplied marker
    ///
    /// Accepts RFC 2822 dates (the HTTP `Last-Modified` format) and, as a
    /// convenience, RFC 3339 timestamps.
    ///
    /// # Returns
    /// * `Ok(Marker)` if the string is a well-formed date
    /// * `Err(ConfigError::InvalidMarker)` otherwise
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        if DateTime::parse_from_rfc2822(s).is_ok() || DateTime::parse_from_rfc3339(s).is_ok() {
            Ok(Self(s.to_string()))
        } else {
            Err(ConfigError::InvalidMarker(s.to_string()))
        }
    }

    /// Wraps a marker exactly as the store returned it, without validation
    pub fn from_store(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the marker as a string slice, suitable for a request header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
