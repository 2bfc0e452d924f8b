use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths::paths;

/// Shortest secret that is also masked where it appears outside a URL.
pub const MIN_BARE_REDACT_LEN: usize = 8;

/// Upper bound on the post-creation provisioning wait.
pub const MAX_PROVISION_DELAY: Duration = Duration::from_secs(600);

pub const DEFAULT_TEMPLATE_URL: &str = "https://github.com/aerele/pwa_build.git";

/// Top-level configuration structure loaded from `config.toml`.
///
/// Example TOML:
/// ```toml
/// [github]
/// username = "octocat"
/// token    = "ghp_..."
/// private  = true
///
/// [site]
/// path = "/srv/bench/sites/site1"
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub github: IntegrationSettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub commit: CommitAuthor,
}

/// GitHub integration settings: who pushes, where, and with what visibility.
#[derive(Debug, Deserialize, Clone)]
pub struct IntegrationSettings {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: Secret,
    #[serde(default)]
    pub push_to_org: bool,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_git_url")]
    pub git_url: String,
    #[serde(default = "default_provision_delay")]
    pub provision_delay_secs: u64,
    #[serde(default)]
    pub provision_poll: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteSettings {
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default = "default_template_url")]
    pub template_url: String,
}

/// Identity used for automated commits when git has none configured.
#[derive(Debug, Deserialize, Clone)]
pub struct CommitAuthor {
    #[serde(default = "default_author_name")]
    pub author_name: String,
    #[serde(default = "default_author_email")]
    pub author_email: String,
}

/// A secret string (the access token).
///
/// `Debug` never prints the value; use [`Secret::expose`] where the raw value
/// is actually needed and [`Secret::redact`] on anything shown to users.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hide the secret in `text`, replacing it with `***`.
    ///
    /// The URL userinfo form `<secret>@` is always masked. Bare occurrences are
    /// masked only for secrets of at least [`MIN_BARE_REDACT_LEN`] characters,
    /// so a very short value cannot mangle unrelated words.
    pub fn redact(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_string();
        }
        let masked = text.replace(&format!("{}@", self.0), "***@");
        if self.0.chars().count() >= MIN_BARE_REDACT_LEN {
            masked.replace(&self.0, "***")
        } else {
            masked
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl IntegrationSettings {
    /// Organization to push into, if org pushes are enabled and one is named.
    pub fn target_org(&self) -> Option<&str> {
        if !self.push_to_org {
            return None;
        }
        self.organization
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
    }

    /// Configured provisioning wait, capped at [`MAX_PROVISION_DELAY`].
    pub fn provision_delay(&self) -> Duration {
        Duration::from_secs(self.provision_delay_secs).min(MAX_PROVISION_DELAY)
    }
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            token: Secret::default(),
            push_to_org: false,
            organization: None,
            private: false,
            api_url: default_api_url(),
            git_url: default_git_url(),
            provision_delay_secs: default_provision_delay(),
            provision_poll: false,
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            template_url: default_template_url(),
        }
    }
}

impl Default for CommitAuthor {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_git_url() -> String {
    "https://github.com".to_string()
}

fn default_provision_delay() -> u64 {
    10
}

fn default_template_url() -> String {
    DEFAULT_TEMPLATE_URL.to_string()
}

fn default_author_name() -> String {
    "PWA Builder".to_string()
}

fn default_author_email() -> String {
    "pwa-builder@localhost".to_string()
}

/// Parse settings from TOML text and apply environment overrides.
///
/// `GITHUB_TOKEN`, when set and non-empty, replaces `github.token`.
pub fn parse_settings(txt: &str) -> Result<Settings> {
    let mut cfg: Settings = toml::from_str(txt).context("failed to parse config.toml")?;
    if let Ok(tok) = env::var("GITHUB_TOKEN")
        && !tok.is_empty()
    {
        cfg.github.token = Secret::new(tok);
    }
    Ok(cfg)
}

/// Load settings from `path`, or from the default location when `None`.
///
/// # Errors
/// - Returns an error if the file cannot be read (the message includes the path).
/// - Returns an error if parsing the TOML fails.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let resolved = match path {
        Some(p) => p.to_path_buf(),
        None => paths()?.config,
    };
    let txt = fs::read_to_string(&resolved)
        .with_context(|| format!("config not found: {}", resolved.display()))?;
    parse_settings(&txt)
}
