//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/bugsight/config.toml)
//! 3. Project config (.bugsight/config.toml)
//! 4. Environment variables (BUGSIGHT_* prefix, `__` separates nesting levels)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{BugsightError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        figment = figment.merge(Self::env());

        Self::extract(figment)
    }

    /// Load configuration from one file instead of the global/project layers
    /// (defaults → file → env vars)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(BugsightError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Self::env());

        Self::extract(figment)
    }

    // BUGSIGHT_GATEWAY__API_KEY -> gateway.api_key
    fn env() -> Env {
        Env::prefixed("BUGSIGHT_").split("__").lowercase(true)
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| BugsightError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/bugsight/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("bugsight"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".bugsight")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render a configuration as JSON or TOML
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| BugsightError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize project configuration in `root`, returning the config path
    pub fn init_project(root: &Path, force: bool) -> Result<PathBuf> {
        let project_dir = root.join(Self::project_dir());
        fs::create_dir_all(&project_dir)?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        } else {
            info!("Project config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Generate default project config content (TOML)
    fn default_project_config() -> String {
        r#"# bugsight Project Configuration
# Secrets belong in the environment: BUGSIGHT_GATEWAY__API_KEY

version = "1.0"

[gateway]
# account_id = ""
# gateway_id = ""
model = "gemini-2.0-flash"
fallback_base_url = "https://generativelanguage.googleapis.com"
timeout_secs = 120

[generation]
temperature = 0.3
top_p = 0.95
max_output_tokens = 4096

[media]
internal_prefix = "/api/media/"
storage_hosts = ["r2.cloudflarestorage.com", "r2.dev"]
# storage_root = "media"

[analysis]
include_screenshot = true
include_video = true
# deadline_secs = 180
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[gateway]
account_id = "acct"
gateway_id = "gw"
model = "gemini-1.5-pro"

[analysis]
deadline_secs = 30
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.gateway.model, "gemini-1.5-pro");
        assert_eq!(config.gateway.account_id.as_deref(), Some("acct"));
        assert_eq!(config.analysis.deadline_secs, Some(30));
        // untouched sections keep their defaults
        assert_eq!(config.generation.max_output_tokens, 4096);
        assert!(config.analysis.include_screenshot);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[generation]\ntemperature = 5.0\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml"));
        assert!(matches!(result, Err(BugsightError::Config(_))));
    }

    #[test]
    fn test_init_project_writes_loadable_template() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::init_project(temp_dir.path(), false).unwrap();
        assert!(path.exists());

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.gateway.model, "gemini-2.0-flash");
        assert!(config.gateway.api_key.is_none());
    }

    #[test]
    fn test_load_from_file_applies_env_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[gateway]\naccount_id = \"acct\"\ngateway_id = \"gw\"\n").unwrap();

        // SAFETY: no other test reads or writes this variable
        unsafe {
            std::env::set_var("BUGSIGHT_GATEWAY__API_KEY", "from-env");
        }
        let config = ConfigLoader::load_from_file(&path);
        unsafe {
            std::env::remove_var("BUGSIGHT_GATEWAY__API_KEY");
        }

        let config = config.unwrap();
        assert_eq!(config.gateway.api_key.as_deref(), Some("from-env"));
        assert!(config.gateway.settings(&config.generation).is_ok());
    }

    #[test]
    fn test_render_toml_omits_api_key() {
        let mut config = Config::default();
        config.gateway.api_key = Some("do-not-print".to_string());
        let rendered = ConfigLoader::render(&config, false).unwrap();
        assert!(rendered.contains("gemini-2.0-flash"));
        assert!(!rendered.contains("do-not-print"));
    }
}
