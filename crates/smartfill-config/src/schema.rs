//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub fill: FillConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Browser (Chrome DevTools Protocol) connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// HTTP debugging endpoint of the browser.
    #[serde(default = "default_cdp_endpoint")]
    pub endpoint: String,

    /// Only attach to a page whose URL contains this string.
    #[serde(default)]
    pub target_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_cdp_endpoint(),
            target_url: None,
        }
    }
}

fn default_cdp_endpoint() -> String {
    "http://127.0.0.1:9222".to_string()
}

/// Value resolver (Anthropic Messages API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_resolver_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_resolver_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_resolver_timeout() -> u64 {
    60
}

/// Cross-frame fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-frame reply deadline; a frame that misses it counts as empty.
    #[serde(default = "default_frame_timeout_ms")]
    pub frame_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            frame_timeout_ms: default_frame_timeout_ms(),
        }
    }
}

fn default_frame_timeout_ms() -> u64 {
    5000
}

/// Fill executor behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    /// Focus each control before writing and blur it afterwards.
    #[serde(default = "default_true")]
    pub focus_and_blur: bool,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            focus_and_blur: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Persistent state location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".smartfill")
        .join("state.json")
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
