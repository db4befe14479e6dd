//! Process configuration from `GLUCORISK_*` environment variables.
//!
//! Invalid values fall back to defaults. Settings are read before logging
//! is installed, so fallbacks are collected in [`Settings::warnings`] and
//! logged by the caller.

use std::path::PathBuf;

pub const ARTIFACTS_DIR_VAR: &str = "GLUCORISK_ARTIFACTS_DIR";
pub const ENVIRONMENT_VAR: &str = "GLUCORISK_ENVIRONMENT";
pub const REQUIRE_MANIFEST_VAR: &str = "GLUCORISK_REQUIRE_MANIFEST";
pub const LOG_MODE_VAR: &str = "GLUCORISK_LOG_MODE";
pub const LOG_FILE_VAR: &str = "GLUCORISK_LOG_FILE";

const DEFAULT_ARTIFACTS_DIR: &str = "models";
const DEFAULT_LOG_FILE: &str = "glucorisk.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when `GLUCORISK_LOG_FILE` is set, stderr otherwise.
    #[default]
    Auto,
    File,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub artifacts_dir: PathBuf,
    pub environment: Environment,
    pub require_manifest: bool,
    pub log_mode: LogMode,
    /// Explicit `GLUCORISK_LOG_FILE`, if any.
    pub log_file: Option<PathBuf>,
    /// Values that were ignored, one message each.
    pub warnings: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            environment: Environment::default(),
            require_manifest: false,
            log_mode: LogMode::default(),
            log_file: None,
            warnings: Vec::new(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let value = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(dir) = value(ARTIFACTS_DIR_VAR) {
            cfg.artifacts_dir = PathBuf::from(dir);
        }

        if let Some(v) = value(ENVIRONMENT_VAR) {
            match v.to_ascii_lowercase().as_str() {
                "development" | "dev" => cfg.environment = Environment::Development,
                "production" | "prod" => cfg.environment = Environment::Production,
                _ => cfg.ignored(ENVIRONMENT_VAR, &v),
            }
        }

        if let Some(v) = value(REQUIRE_MANIFEST_VAR) {
            match parse_bool(&v) {
                Some(b) => cfg.require_manifest = b,
                None => cfg.ignored(REQUIRE_MANIFEST_VAR, &v),
            }
        }

        if let Some(v) = value(LOG_MODE_VAR) {
            match v.to_ascii_lowercase().as_str() {
                "auto" => cfg.log_mode = LogMode::Auto,
                "file" => cfg.log_mode = LogMode::File,
                "stderr" => cfg.log_mode = LogMode::Stderr,
                _ => cfg.ignored(LOG_MODE_VAR, &v),
            }
        }

        if let Some(path) = value(LOG_FILE_VAR) {
            cfg.log_file = Some(PathBuf::from(path));
        }

        cfg
    }

    /// Whether bundles must carry a valid manifest. Always true in production.
    #[must_use]
    pub fn manifest_required(&self) -> bool {
        self.require_manifest || self.environment == Environment::Production
    }

    /// Log file to write to, or `None` for stderr.
    #[must_use]
    pub fn log_destination(&self) -> Option<PathBuf> {
        match self.log_mode {
            LogMode::File => Some(
                self.log_file
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            ),
            LogMode::Stderr => None,
            LogMode::Auto => self.log_file.clone(),
        }
    }

    fn ignored(&mut self, name: &str, value: &str) {
        self.warnings
            .push(format!("Ignoring invalid {name}={value:?}; using default"));
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
