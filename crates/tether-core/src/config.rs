// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TetherError};

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Component metadata key holding the native library name.
    pub library_metadata_key: String,
    /// Correlation code passed to `startActivityForResult` for the picker.
    pub file_open_request_code: i32,
    /// MIME filter for the open-document request.
    pub file_open_mime_type: String,
    /// Title of the chooser wrapping the open-document request.
    pub file_picker_title: String,
    /// Lowest host API level with a root window insets accessor. Older hosts
    /// use the visible-frame fallback.
    pub root_insets_min_api: u32,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            library_metadata_key: "android.app.lib_name".into(),
            file_open_request_code: 1,
            file_open_mime_type: "*/*".into(),
            file_picker_title: "Open File".into(),
            root_insets_min_api: 23,
            log_filter: "info".into(),
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TetherError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.library_metadata_key.trim().is_empty() {
            return Err(TetherError::Config(
                "library_metadata_key must not be empty".into(),
            ));
        }
        // FragmentActivity hosts reject request codes wider than 16 bits.
        if !(0..=0xFFFF).contains(&self.file_open_request_code) {
            return Err(TetherError::Config(format!(
                "file_open_request_code {} is outside 0..=65535",
                self.file_open_request_code
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BridgeConfig::from_json_str(r#"{ "file_open_request_code": 42 }"#)
            .expect("parse");
        assert_eq!(config.file_open_request_code, 42);
        assert_eq!(config.library_metadata_key, "android.app.lib_name");
        assert_eq!(config.root_insets_min_api, 23);
    }

    #[test]
    fn empty_metadata_key_is_rejected() {
        let err = BridgeConfig::from_json_str(r#"{ "library_metadata_key": " " }"#)
            .expect_err("must fail");
        assert!(matches!(err, TetherError::Config(_)));
    }

    #[test]
    fn out_of_range_request_code_is_rejected() {
        let err = BridgeConfig::from_json_str(r#"{ "file_open_request_code": -5 }"#)
            .expect_err("must fail");
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = BridgeConfig::from_json_str("{ nope").expect_err("must fail");
        assert!(matches!(err, TetherError::Config(_)));
    }
}
