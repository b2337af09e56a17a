//! Configuration management
//!
//! This module handles loading and parsing configuration for the Marquee CMS.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults. The loaded
//! `Config` is constructed once at startup and passed down explicitly;
//! nothing in the crate reads configuration from ambient globals.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a YAML file, falling back to defaults when the
    /// file does not exist, then apply environment variable overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `MARQUEE_HOST`, `MARQUEE_PORT`, `MARQUEE_DATABASE_URL`,
    /// `MARQUEE_JWT_SECRET`, `MARQUEE_CORS_ORIGIN`.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("MARQUEE_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("MARQUEE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(origin) = std::env::var("MARQUEE_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Ok(url) = std::env::var("MARQUEE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("MARQUEE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/marquee.db".to_string()
}

/// Authentication configuration
///
/// The JWT secret is process-wide state loaded once at startup; it is never
/// rotated at runtime. The default value exists so development environments
/// start without ceremony - production deployments must override it via
/// `MARQUEE_JWT_SECRET` or config.yml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Session token lifetime in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Name of the auth cookie set on login
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Password strength policy applied at account creation
    #[serde(default)]
    pub password_policy: PasswordPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            cookie_name: default_cookie_name(),
            password_policy: PasswordPolicy::default(),
        }
    }
}

fn default_jwt_secret() -> String {
    "marquee-dev-secret-change-me".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_cookie_name() -> String {
    "auth-token".to_string()
}

/// Password strength policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Require at least one uppercase letter
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    /// Require at least one lowercase letter
    #[serde(default = "default_true")]
    pub require_lowercase: bool,
    /// Require at least one digit
    #[serde(default = "default_true")]
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            require_uppercase: default_true(),
            require_lowercase: default_true(),
            require_digit: default_true(),
        }
    }
}

fn default_min_length() -> usize {
    8
}

fn default_true() -> bool {
    true
}
