use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    ConfigDirNotFound,

    #[error("Settings file not found: {0}")]
    SettingsFileNotFound(String),

    #[error(
        "No admin credential for the virtual machine.\n\
        Set VMFLOW_ADMIN_PASSWORD or point virtual_machine.ssh_public_key_path at a public key"
    )]
    MissingAdminCredential,

    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
