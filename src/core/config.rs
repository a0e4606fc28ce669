//! Configuration management

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "terraems-quotation";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        let app_config_dir = config_dir.join(APP_DIR);

        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)?;
        }

        Ok(app_config_dir.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            log::info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Path of the key-value store database
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage.db_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?;
        let app_dir = data_dir.join(APP_DIR);
        fs::create_dir_all(&app_dir)?;

        Ok(app_dir.join("store.db"))
    }
}

/// General quotation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Currency symbol used when formatting amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Pricing region shown under the document title
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_currency() -> String { "INR".to_string() }
fn default_currency_symbol() -> String { "\u{20B9}".to_string() } // Rupee sign
fn default_region() -> String { "India Pricing (INR)".to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            currency_symbol: default_currency_symbol(),
            region: default_region(),
        }
    }
}

/// Persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the SQLite store location
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Admin credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

fn default_admin_username() -> String { "admin".to_string() }
fn default_admin_password() -> String { "password".to_string() }

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
        }
    }
}

/// Exported quotation document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// File name the quotation is saved under
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(default = "default_company")]
    pub company: String,
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_phone")]
    pub phone: String,
    /// Terms and conditions, one entry per numbered line
    #[serde(default = "default_terms")]
    pub terms: Vec<String>,
}

fn default_file_name() -> String { "TerraEMS_Quotation.md".to_string() }
fn default_company() -> String { "TerraEMS".to_string() }
fn default_address() -> String { "Gujarat, India".to_string() }
fn default_email() -> String { "info@terraems.com".to_string() }
fn default_phone() -> String { "+91 XXXXXXXXXX".to_string() }
fn default_terms() -> Vec<String> {
    vec![
        "Prices are in Indian Rupees (INR) and exclusive of applicable taxes.".to_string(),
        "This quotation is valid for 30 days from the date of issue.".to_string(),
        "Payment terms: 50% advance, 50% upon completion.".to_string(),
        "Delivery timeline will be confirmed upon order confirmation.".to_string(),
    ]
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            company: default_company(),
            address: default_address(),
            email: default_email(),
            phone: default_phone(),
            terms: default_terms(),
        }
    }
}
