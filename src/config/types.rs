//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/bugsight/) and project (.bugsight/) level configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{gateway as gateway_constants, generation, media, network};
use crate::types::{BugsightError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Model endpoint settings
    pub gateway: GatewayConfig,

    /// Generation parameters sent with every request
    pub generation: GenerationConfig,

    /// Attachment resolution settings
    pub media: MediaConfig,

    /// Documentation corpus settings
    pub docs: DocsConfig,

    /// Default analysis options
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            gateway: GatewayConfig::default(),
            generation: GenerationConfig::default(),
            media: MediaConfig::default(),
            docs: DocsConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `BugsightError::Config` on validation failure.
    ///
    /// Absent credentials are not a range error; they surface later through
    /// [`GatewayConfig::settings`].
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(BugsightError::Config(format!(
                "generation.temperature must be between 0.0 and 2.0, got {}",
                self.generation.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(BugsightError::Config(format!(
                "generation.top_p must be between 0.0 and 1.0, got {}",
                self.generation.top_p
            )));
        }

        if self.generation.max_output_tokens == 0 {
            return Err(BugsightError::Config(
                "generation.max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if self.gateway.timeout_secs == 0 {
            return Err(BugsightError::Config(
                "gateway.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.analysis.deadline_secs == Some(0) {
            return Err(BugsightError::Config(
                "analysis.deadline_secs must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Gateway Configuration
// =============================================================================

/// Model endpoint configuration as loaded from files and environment.
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway account identifier
    pub account_id: Option<String>,

    /// Gateway identifier within the account
    pub gateway_id: Option<String>,

    /// Model API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Overrides the primary base derived from account and gateway ids
    pub primary_base_url: Option<String>,

    /// Direct endpoint used when the primary fails
    pub fallback_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("account_id", &self.account_id)
            .field("gateway_id", &self.gateway_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("primary_base_url", &self.primary_base_url)
            .field("fallback_base_url", &self.fallback_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            gateway_id: None,
            api_key: None,
            model: gateway_constants::DEFAULT_MODEL.to_string(),
            primary_base_url: None,
            fallback_base_url: gateway_constants::FALLBACK_BASE.to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    /// Convert into validated settings.
    ///
    /// Every missing required field is reported at once through
    /// `BugsightError::ConfigurationMissing`.
    pub fn settings(&self, generation: &GenerationConfig) -> Result<GatewaySettings> {
        let account_id = non_empty(&self.account_id);
        let gateway_id = non_empty(&self.gateway_id);
        let api_key = non_empty(&self.api_key);

        let mut missing = Vec::new();
        if account_id.is_none() {
            missing.push("gateway.account_id".to_string());
        }
        if gateway_id.is_none() {
            missing.push("gateway.gateway_id".to_string());
        }
        if api_key.is_none() {
            missing.push("gateway.api_key".to_string());
        }

        let (Some(account_id), Some(gateway_id), Some(api_key)) = (account_id, gateway_id, api_key)
        else {
            return Err(BugsightError::ConfigurationMissing { fields: missing });
        };

        if self.model.trim().is_empty() {
            return Err(BugsightError::ConfigurationMissing {
                fields: vec!["gateway.model".to_string()],
            });
        }

        let primary_base = match non_empty(&self.primary_base_url) {
            Some(url) => url.to_string(),
            None => format!(
                "{}/{}/{}/{}",
                gateway_constants::GATEWAY_BASE,
                account_id,
                gateway_id,
                gateway_constants::GATEWAY_PROVIDER
            ),
        };

        Ok(GatewaySettings {
            primary_base: primary_base.trim_end_matches('/').to_string(),
            fallback_base: self.fallback_base_url.trim_end_matches('/').to_string(),
            model: self.model.clone(),
            api_key: SecretString::from(api_key.to_string()),
            timeout: Duration::from_secs(self.timeout_secs),
            generation: generation.clone(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Validated, ready-to-use gateway settings
#[derive(Clone)]
pub struct GatewaySettings {
    pub primary_base: String,
    pub fallback_base: String,
    pub model: String,
    pub api_key: SecretString,
    pub timeout: Duration,
    pub generation: GenerationConfig,
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("primary_base", &self.primary_base)
            .field("fallback_base", &self.fallback_base)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: generation::TEMPERATURE,
            top_p: generation::TOP_P,
            max_output_tokens: generation::MAX_OUTPUT_TOKENS,
        }
    }
}

// =============================================================================
// Media Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Prefix of internal relative media references
    pub internal_prefix: String,

    /// Host suffixes treated as internal object storage
    pub storage_hosts: Vec<String>,

    /// Bucket name stripped from path-style storage URLs
    pub bucket: Option<String>,

    /// Directory backing the filesystem blob store (CLI use)
    pub storage_root: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            internal_prefix: media::INTERNAL_PREFIX.to_string(),
            storage_hosts: media::STORAGE_HOSTS.iter().map(|h| h.to_string()).collect(),
            bucket: None,
            storage_root: None,
        }
    }
}

// =============================================================================
// Docs Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocsConfig {
    /// External YAML corpus; the embedded corpus is used when unset
    pub corpus_path: Option<PathBuf>,
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run the screenshot sub-analysis when a screenshot is attached
    pub include_screenshot: bool,

    /// Run the video sub-analysis when a video is attached
    pub include_video: bool,

    /// Overall deadline for one analysis, in seconds
    pub deadline_secs: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_screenshot: true,
            include_video: true,
            deadline_secs: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn configured() -> GatewayConfig {
        GatewayConfig {
            account_id: Some("acct".to_string()),
            gateway_id: Some("gw".to_string()),
            api_key: Some("secret-key".to_string()),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.gateway.model, "gemini-2.0-flash");
        assert_eq!(config.generation.max_output_tokens, 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_settings_reports_all_missing_fields() {
        let err = GatewayConfig::default()
            .settings(&GenerationConfig::default())
            .unwrap_err();
        match err {
            BugsightError::ConfigurationMissing { fields } => {
                assert_eq!(
                    fields,
                    vec![
                        "gateway.account_id",
                        "gateway.gateway_id",
                        "gateway.api_key"
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = GatewayConfig {
            api_key: Some("   ".to_string()),
            ..configured()
        };
        assert!(matches!(
            config.settings(&GenerationConfig::default()),
            Err(BugsightError::ConfigurationMissing { .. })
        ));
    }

    #[test]
    fn test_settings_derive_gateway_base() {
        let settings = configured().settings(&GenerationConfig::default()).unwrap();
        assert_eq!(
            settings.primary_base,
            "https://gateway.ai.cloudflare.com/v1/acct/gw/google-ai-studio"
        );
        assert_eq!(
            settings.fallback_base,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(settings.api_key.expose_secret(), "secret-key");
    }

    #[test]
    fn test_primary_override_trims_trailing_slash() {
        let config = GatewayConfig {
            primary_base_url: Some("http://127.0.0.1:9000/".to_string()),
            ..configured()
        };
        let settings = config.settings(&GenerationConfig::default()).unwrap();
        assert_eq!(settings.primary_base, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", configured());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let json = serde_json::to_string(&configured()).unwrap();
        assert!(!json.contains("secret-key"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.generation.top_p = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gateway.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.deadline_secs = Some(0);
        assert!(config.validate().is_err());
    }
}
