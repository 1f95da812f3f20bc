use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Where each entity collection is persisted
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_bikes_file")]
    pub bikes_file: String,
    #[serde(default = "default_bookings_file")]
    pub bookings_file: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".velo").join("data")
}
fn default_users_file() -> String {
    "users.json".to_string()
}
fn default_bikes_file() -> String {
    "bikes.json".to_string()
}
fn default_bookings_file() -> String {
    "bookings.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_file: default_users_file(),
            bikes_file: default_bikes_file(),
            bookings_file: default_bookings_file(),
        }
    }
}

impl StorageConfig {
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn bikes_path(&self) -> PathBuf {
        self.data_dir.join(&self.bikes_file)
    }

    pub fn bookings_path(&self) -> PathBuf {
        self.data_dir.join(&self.bookings_file)
    }
}

/// Audit log settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from(".velo").join("audit")
}
fn default_true() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            dir: default_audit_dir(),
            enabled: default_true(),
        }
    }
}

/// First-run bootstrap settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_true")]
    pub seed_demo_fleet: bool,
}

fn default_admin_username() -> String {
    "admin".to_string()
}
fn default_admin_password() -> String {
    "admin123".to_string()
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            seed_demo_fleet: default_true(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: project (.velo/config.toml) > user (~/.velo/config.toml) > defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".velo").join("config.toml");
            if user_config.exists() {
                let user = Self::load_from(&user_config)?;
                config.merge(user);
            }
        }

        let project_config = Path::new(".velo").join("config.toml");
        if project_config.exists() {
            let project = Self::load_from(&project_config)?;
            config.merge(project);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority).
    /// Sections are taken wholesale when the other file set them.
    pub fn merge(&mut self, other: Config) {
        if other.storage != StorageConfig::default() {
            self.storage = other.storage;
        }
        if other.audit != AuditConfig::default() {
            self.audit = other.audit;
        }
        if other.bootstrap != BootstrapConfig::default() {
            self.bootstrap = other.bootstrap;
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (field, name) in [
            ("storage.users_file", &self.storage.users_file),
            ("storage.bikes_file", &self.storage.bikes_file),
            ("storage.bookings_file", &self.storage.bookings_file),
        ] {
            if name.trim().is_empty() {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: "File name must not be empty".to_string(),
                });
            }
        }

        // The three slots must not share a file
        let names = [
            &self.storage.users_file,
            &self.storage.bikes_file,
            &self.storage.bookings_file,
        ];
        for i in 0..names.len() {
            for j in i + 1..names.len() {
                if names[i] == names[j] {
                    errors.push(ValidationError {
                        field: "storage".to_string(),
                        message: format!("Collections share the same file '{}'", names[i]),
                    });
                }
            }
        }

        if self.bootstrap.admin_username.trim().is_empty() {
            errors.push(ValidationError {
                field: "bootstrap.admin_username".to_string(),
                message: "Admin username must not be empty".to_string(),
            });
        }
        if self.bootstrap.admin_password.is_empty() {
            errors.push(ValidationError {
                field: "bootstrap.admin_password".to_string(),
                message: "Admin password must not be empty".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
