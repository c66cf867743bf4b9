use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable naming a directory with an overriding `Settings.toml`
pub const CONFIG_DIR_ENV: &str = "INSPECTOR_CONFIG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InspectorSettings {
    pub application: ApplicationSettings,
    pub logging: LoggingSettings,
    pub decoder: DecoderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DecoderSettings {
    /// Indent JSON responses
    pub pretty_json: bool,
    /// Largest accepted request body in bytes
    pub max_payload_bytes: usize,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            pretty_json: true,
            max_payload_bytes: 256 * 1024,
        }
    }
}

impl InspectorSettings {
    /// Load settings from configuration files and environment variables, then
    /// initialize logging at the configured level
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        // Load base settings from TOML or defaults
        let mut settings = Self::load_base_settings()?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut settings);

        env_logger::Builder::new()
            .parse_filters(&settings.logging.level)
            .try_init()?;

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `INSPECTOR_CONFIG_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = Path::new("Settings.toml");
        if default_config_path.exists() {
            settings = Self::load_from_path(default_config_path)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(config_dir) = std::env::var(CONFIG_DIR_ENV) {
            let config_path = Path::new(&config_dir).join("Settings.toml");
            if config_path.exists() {
                settings = Self::load_from_path(&config_path)?;
                println!("✓ Overriding settings from {}", config_path.display());
            } else {
                println!(
                    "ℹ {CONFIG_DIR_ENV} set but no Settings.toml found at: {}",
                    config_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a single TOML settings file; missing sections keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn load_from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        let app = &mut settings.application;
        if let Ok(host) = std::env::var("HOST") {
            app.host = host;
        }
        if let Ok(Ok(port)) = std::env::var("PORT").map(|p| p.parse::<u16>()) {
            app.port = port;
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app.cors_origins = cors_origins;
        }

        if let Ok(log_level) = std::env::var("RUST_LOG") {
            settings.logging.level = log_level;
        }

        let decoder = &mut settings.decoder;
        if let Ok(Ok(pretty)) = std::env::var("PRETTY_JSON").map(|v| v.parse::<bool>()) {
            decoder.pretty_json = pretty;
        }
        if let Ok(Ok(limit)) = std::env::var("MAX_PAYLOAD_BYTES").map(|v| v.parse::<usize>()) {
            decoder.max_payload_bytes = limit;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = fs::read_to_string(".env") {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
