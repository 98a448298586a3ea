//! Settings file model and the merge into concrete run options

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LOCATION: &str = "westus";
pub const DEFAULT_RESOURCE_GROUP: &str = "vmflow-rg";
pub const DEFAULT_NAME_PREFIX: &str = "vmflow";
pub const DEFAULT_ADDRESS_PREFIX: &str = "10.0.0.0/16";
pub const DEFAULT_SUBNET_NAME: &str = "default";
pub const DEFAULT_SUBNET_PREFIX: &str = "10.0.0.0/24";
pub const DEFAULT_PUBLIC_IP_SKU: &str = "Basic";
pub const DEFAULT_IP_CONFIGURATION_NAME: &str = "ipconfig1";
pub const DEFAULT_VM_SIZE: &str = "Standard_B1s";
pub const DEFAULT_ADMIN_USERNAME: &str = "azureuser";
pub const DEFAULT_IMAGE_PUBLISHER: &str = "Canonical";
pub const DEFAULT_IMAGE_OFFER: &str = "0001-com-ubuntu-server-jammy";
pub const DEFAULT_IMAGE_SKU: &str = "22_04-lts-gen2";
pub const DEFAULT_IMAGE_VERSION: &str = "latest";
pub const DEFAULT_OS_DISK_STORAGE_TYPE: &str = "Standard_LRS";
pub const DEFAULT_STORAGE_SKU: &str = "Standard_LRS";
pub const DEFAULT_STORAGE_KIND: &str = "StorageV2";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Settings as written in `vmflow.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Resource group all resources are created in (default: `vmflow-rg`)
    pub resource_group: Option<String>,

    /// Azure region (default: `westus`)
    pub location: Option<String>,

    /// Lowercase alphanumeric prefix for generated names (default: `vmflow`)
    pub name_prefix: Option<String>,

    /// Layout of the timestamp suffix (default: `short`)
    pub suffix_format: Option<SuffixFormat>,

    /// What to delete at the end of a run (default: `all`)
    pub cleanup: Option<CleanupPolicy>,

    /// Create-or-update the resource group before provisioning (default: false)
    pub create_resource_group: Option<bool>,

    /// Seconds between long-running operation polls (default: 5)
    pub poll_interval_secs: Option<u64>,

    pub virtual_network: VirtualNetworkSettings,
    pub public_ip: PublicIpSettings,
    pub network_interface: NetworkInterfaceSettings,
    pub virtual_machine: VirtualMachineSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VirtualNetworkSettings {
    /// Address space (default: `["10.0.0.0/16"]`)
    pub address_prefixes: Option<Vec<String>>,
    /// Subnet name (default: `default`)
    pub subnet_name: Option<String>,
    /// Subnet prefix (default: `10.0.0.0/24`)
    pub subnet_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublicIpSettings {
    /// Static or Dynamic (default: Dynamic)
    pub allocation_method: Option<AllocationMethod>,
    /// SKU name (default: `Basic`)
    pub sku: Option<String>,
    /// DNS label; unset means no DNS settings
    pub dns_label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkInterfaceSettings {
    /// IP configuration name (default: `ipconfig1`)
    pub ip_configuration_name: Option<String>,
    /// Private IP allocation (default: Dynamic)
    pub private_ip_allocation: Option<AllocationMethod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VirtualMachineSettings {
    /// VM size (default: `Standard_B1s`)
    pub size: Option<String>,
    /// Admin user (default: `azureuser`)
    pub admin_username: Option<String>,
    /// Path to an SSH public key for the admin user
    pub ssh_public_key_path: Option<PathBuf>,
    /// Never read from the file; supplied through `VMFLOW_ADMIN_PASSWORD`.
    #[serde(skip)]
    pub admin_password: Option<String>,
    pub image: ImageSettings,
    /// Managed OS disk storage type (default: `Standard_LRS`)
    pub os_disk_storage_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageSettings {
    pub publisher: Option<String>,
    pub offer: Option<String>,
    pub sku: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    /// Create (and clean up) a storage account in the run (default: false)
    pub enabled: Option<bool>,
    /// SKU name (default: `Standard_LRS`)
    pub sku: Option<String>,
    /// Account kind (default: `StorageV2`)
    pub kind: Option<String>,
}

/// Which resources a run deletes after provisioning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
    /// VM, network interface, public IP, virtual network, storage account
    #[default]
    All,
    /// Only the VM; network resources are left in place
    VmOnly,
    /// Nothing is deleted
    None,
}

impl fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupPolicy::All => write!(f, "all"),
            CleanupPolicy::VmOnly => write!(f, "vm-only"),
            CleanupPolicy::None => write!(f, "none"),
        }
    }
}

impl FromStr for CleanupPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(CleanupPolicy::All),
            "vm-only" | "vm" => Ok(CleanupPolicy::VmOnly),
            "none" | "keep" => Ok(CleanupPolicy::None),
            other => Err(format!(
                "invalid cleanup policy '{}' (expected all, vm-only or none)",
                other
            )),
        }
    }
}

/// Field layout of the timestamp name suffix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuffixFormat {
    /// MMDDhhmmss, 10 digits
    #[default]
    Short,
    /// YYYYMMDDhhmmss, 14 digits
    WithYear,
}

/// IP allocation method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationMethod {
    #[default]
    Dynamic,
    Static,
}

impl fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationMethod::Dynamic => write!(f, "Dynamic"),
            AllocationMethod::Static => write!(f, "Static"),
        }
    }
}

/// Fully resolved options for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub resource_group: String,
    pub location: String,
    pub name_prefix: String,
    pub suffix_format: SuffixFormat,
    pub cleanup: CleanupPolicy,
    pub create_resource_group: bool,
    pub poll_interval: Duration,
    pub virtual_network: VirtualNetworkOptions,
    pub public_ip: PublicIpOptions,
    pub network_interface: NetworkInterfaceOptions,
    pub virtual_machine: VirtualMachineOptions,
    /// `None` when the storage account step is disabled
    pub storage: Option<StorageOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNetworkOptions {
    pub address_prefixes: Vec<String>,
    pub subnet_name: String,
    pub subnet_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicIpOptions {
    pub allocation_method: AllocationMethod,
    pub sku: String,
    pub dns_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterfaceOptions {
    pub ip_configuration_name: String,
    pub private_ip_allocation: AllocationMethod,
}

#[derive(Debug, Clone)]
pub struct VirtualMachineOptions {
    pub size: String,
    pub admin_username: String,
    /// `None` until a password or SSH key is supplied; checked before a run starts
    pub admin_credential: Option<AdminCredential>,
    pub image: ImageOptions,
    pub os_disk_storage_type: String,
}

impl VirtualMachineOptions {
    /// The admin credential, or an error naming how to supply one
    pub fn require_admin_credential(&self) -> Result<&AdminCredential> {
        self.admin_credential
            .as_ref()
            .ok_or(ConfigError::MissingAdminCredential)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOptions {
    pub sku: String,
    pub kind: String,
}

/// Admin login for the VM's OS profile
#[derive(Clone, PartialEq, Eq)]
pub enum AdminCredential {
    Password(String),
    SshPublicKey(String),
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminCredential::Password(_) => write!(f, "Password(***)"),
            AdminCredential::SshPublicKey(key) => f.debug_tuple("SshPublicKey").field(key).finish(),
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply defaults to every unset field and validate the result.
    ///
    /// Reads the SSH public key file when one is configured.
    pub fn resolve(self) -> Result<RunOptions> {
        let name_prefix = self
            .name_prefix
            .unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string());
        validate_name_prefix(&name_prefix)?;

        let location = self
            .location
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        if location.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                field: "location",
                reason: "must not be empty".to_string(),
            });
        }

        let resource_group = self
            .resource_group
            .unwrap_or_else(|| DEFAULT_RESOURCE_GROUP.to_string());
        if resource_group.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                field: "resource_group",
                reason: "must not be empty".to_string(),
            });
        }

        let vnet = self.virtual_network;
        let address_prefixes = vnet
            .address_prefixes
            .unwrap_or_else(|| vec![DEFAULT_ADDRESS_PREFIX.to_string()]);
        if address_prefixes.is_empty() {
            return Err(ConfigError::InvalidSetting {
                field: "virtual_network.address_prefixes",
                reason: "at least one prefix is required".to_string(),
            });
        }

        let vm = self.virtual_machine;
        let admin_credential = match (vm.admin_password, vm.ssh_public_key_path) {
            (_, Some(path)) => {
                let key = std::fs::read_to_string(&path)?;
                Some(AdminCredential::SshPublicKey(key.trim().to_string()))
            }
            (Some(password), None) => Some(AdminCredential::Password(password)),
            (None, None) => None,
        };

        let storage = if self.storage.enabled.unwrap_or(false) {
            Some(StorageOptions {
                sku: self
                    .storage
                    .sku
                    .unwrap_or_else(|| DEFAULT_STORAGE_SKU.to_string()),
                kind: self
                    .storage
                    .kind
                    .unwrap_or_else(|| DEFAULT_STORAGE_KIND.to_string()),
            })
        } else {
            None
        };

        Ok(RunOptions {
            resource_group,
            location,
            name_prefix,
            suffix_format: self.suffix_format.unwrap_or_default(),
            cleanup: self.cleanup.unwrap_or_default(),
            create_resource_group: self.create_resource_group.unwrap_or(false),
            poll_interval: Duration::from_secs(
                self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
            virtual_network: VirtualNetworkOptions {
                address_prefixes,
                subnet_name: vnet
                    .subnet_name
                    .unwrap_or_else(|| DEFAULT_SUBNET_NAME.to_string()),
                subnet_prefix: vnet
                    .subnet_prefix
                    .unwrap_or_else(|| DEFAULT_SUBNET_PREFIX.to_string()),
            },
            public_ip: PublicIpOptions {
                allocation_method: self.public_ip.allocation_method.unwrap_or_default(),
                sku: self
                    .public_ip
                    .sku
                    .unwrap_or_else(|| DEFAULT_PUBLIC_IP_SKU.to_string()),
                dns_label: self.public_ip.dns_label,
            },
            network_interface: NetworkInterfaceOptions {
                ip_configuration_name: self
                    .network_interface
                    .ip_configuration_name
                    .unwrap_or_else(|| DEFAULT_IP_CONFIGURATION_NAME.to_string()),
                private_ip_allocation: self
                    .network_interface
                    .private_ip_allocation
                    .unwrap_or_default(),
            },
            virtual_machine: VirtualMachineOptions {
                size: vm.size.unwrap_or_else(|| DEFAULT_VM_SIZE.to_string()),
                admin_username: vm
                    .admin_username
                    .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
                admin_credential,
                image: ImageOptions {
                    publisher: vm
                        .image
                        .publisher
                        .unwrap_or_else(|| DEFAULT_IMAGE_PUBLISHER.to_string()),
                    offer: vm
                        .image
                        .offer
                        .unwrap_or_else(|| DEFAULT_IMAGE_OFFER.to_string()),
                    sku: vm
                        .image
                        .sku
                        .unwrap_or_else(|| DEFAULT_IMAGE_SKU.to_string()),
                    version: vm
                        .image
                        .version
                        .unwrap_or_else(|| DEFAULT_IMAGE_VERSION.to_string()),
                },
                os_disk_storage_type: vm
                    .os_disk_storage_type
                    .unwrap_or_else(|| DEFAULT_OS_DISK_STORAGE_TYPE.to_string()),
            },
            storage,
        })
    }
}

/// Longest prefix that keeps `{prefix}st{YYYYMMDDhhmmss}` within the
/// 24-character storage account limit
pub const MAX_NAME_PREFIX_LEN: usize = 8;

// Storage account names only allow lowercase letters and digits, and every
// generated name starts with the prefix.
fn validate_name_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || prefix.len() > MAX_NAME_PREFIX_LEN {
        return Err(ConfigError::InvalidSetting {
            field: "name_prefix",
            reason: format!(
                "'{}' must be 1-{} characters",
                prefix, MAX_NAME_PREFIX_LEN
            ),
        });
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(ConfigError::InvalidSetting {
            field: "name_prefix",
            reason: format!("'{}' must be lowercase letters and digits only", prefix),
        });
    }
    Ok(())
}
