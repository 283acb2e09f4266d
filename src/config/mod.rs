use crate::models::AppConfig;
use anyhow::{Context, Result, ensure};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::fs;

/// File name of the optional configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "filemitra.yaml";

/// Prefix for layered overrides, e.g. `FILEMITRA_UPLOAD__MAX_SIZE_BYTES`.
pub const ENV_PREFIX: &str = "FILEMITRA";

/// Bot credentials as exported by the Bot API tooling. They win over every
/// other layer.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Loads the process-wide configuration.
///
/// Layers, lowest precedence first:
/// 1. built-in defaults
/// 2. `<config_dir>/filemitra.yaml` (optional)
/// 3. `FILEMITRA_<SECTION>__<KEY>` environment variables
/// 4. `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for `config_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load and validate configuration using the process environment.
    pub fn load_config(&self) -> Result<AppConfig> {
        self.load_config_with_env(std::env::vars().collect())
    }

    /// Load and validate configuration against an explicit environment.
    pub fn load_config_with_env(&self, env: HashMap<String, String>) -> Result<AppConfig> {
        let token = env.get(TOKEN_ENV).filter(|v| !v.is_empty()).cloned();
        let chat_id = env.get(CHAT_ID_ENV).filter(|v| !v.is_empty()).cloned();

        let settings = Config::builder()
            .add_source(
                Config::try_from(&AppConfig::default())
                    .context("Failed to build default configuration")?,
            )
            .add_source(
                File::from(self.config_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(env.into_iter().collect())),
            )
            .set_override_option("remote.auth_token", token)?
            .set_override_option("remote.target_chat_id", chat_id)?
            .build()
            .with_context(|| format!("Failed to load configuration from {}", self.config_path))?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse configuration: {}", self.config_path))?;

        validate(&config)?;

        tracing::info!(
            "Loaded config: endpoint={}, chat={}, max_size={} bytes, permission={:?}",
            config.remote.endpoint_base_url,
            config.remote.target_chat_id,
            config.upload.max_size_bytes,
            config.permission.mode
        );

        Ok(config)
    }

    /// Write a default config file with empty credentials, unless one exists.
    ///
    /// Returns true if a file was written.
    pub fn write_template(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }

        let yaml_string = serde_yaml_ng::to_string(&AppConfig::default())
            .context("Failed to serialize default config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config template: {}", self.config_path))?;

        tracing::info!("Wrote config template to {}", self.config_path);
        Ok(true)
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

/// Reject configurations the pipeline cannot run with.
pub fn validate(config: &AppConfig) -> Result<()> {
    let remote = &config.remote;

    ensure!(
        !remote.auth_token.trim().is_empty(),
        "Invalid config: bot token is not set (use {} or remote.auth_token)",
        TOKEN_ENV
    );
    ensure!(
        !remote.target_chat_id.trim().is_empty(),
        "Invalid config: target chat is not set (use {} or remote.target_chat_id)",
        CHAT_ID_ENV
    );

    let url = reqwest::Url::parse(&remote.endpoint_base_url).with_context(|| {
        format!(
            "Invalid config: remote.endpoint_base_url is not a URL: {}",
            remote.endpoint_base_url
        )
    })?;
    ensure!(
        matches!(url.scheme(), "http" | "https"),
        "Invalid config: remote.endpoint_base_url must be http(s), got {}",
        url.scheme()
    );

    ensure!(
        config.upload.max_size_bytes > 0,
        "Invalid config: upload.max_size_bytes must be > 0"
    );
    ensure!(
        config.upload.chunk_size_bytes > 0,
        "Invalid config: upload.chunk_size_bytes must be > 0"
    );

    Ok(())
}
