//! Remote resource representations
//!
//! Field names follow the management API's JSON (camelCase, with the
//! `IP`-suffixed names spelled out explicitly). Every field the service fills
//! in is optional so that partial responses still deserialize.

mod compute;
mod network;
mod storage;

pub use compute::*;
pub use network::*;
pub use storage::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Resource types the driver provisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    VirtualNetwork,
    PublicIpAddress,
    NetworkInterface,
    VirtualMachine,
    StorageAccount,
}

impl ResourceKind {
    /// Order in which a full run creates resources; every entry only depends
    /// on entries before it.
    pub const CREATION_ORDER: [ResourceKind; 5] = [
        ResourceKind::StorageAccount,
        ResourceKind::VirtualNetwork,
        ResourceKind::PublicIpAddress,
        ResourceKind::NetworkInterface,
        ResourceKind::VirtualMachine,
    ];

    /// Human-readable name used in log lines
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::VirtualNetwork => "virtual network",
            ResourceKind::PublicIpAddress => "public IP address",
            ResourceKind::NetworkInterface => "network interface",
            ResourceKind::VirtualMachine => "virtual machine",
            ResourceKind::StorageAccount => "storage account",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Common view over every remote resource type
pub trait Resource:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    const KIND: ResourceKind;

    fn id(&self) -> Option<&str>;

    fn name(&self) -> Option<&str>;

    fn location(&self) -> Option<&str>;

    fn provisioning_state(&self) -> Option<&str>;
}

macro_rules! impl_resource {
    ($ty:ty, $kind:expr) => {
        impl $crate::model::Resource for $ty {
            const KIND: $crate::model::ResourceKind = $kind;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }

            fn location(&self) -> Option<&str> {
                self.location.as_deref()
            }

            fn provisioning_state(&self) -> Option<&str> {
                self.properties.provisioning_state.as_deref()
            }
        }
    };
}

pub(crate) use impl_resource;

/// Reference to another resource by its full ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    pub id: String,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

impl Sku {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tier: None,
        }
    }
}

/// Resource group (container for everything a run creates)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing)]
    pub properties: ResourceGroupProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

/// Available API operation as reported by a resource provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOperation {
    pub name: String,
    #[serde(default)]
    pub display: Option<OperationDisplay>,
    #[serde(default)]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDisplay {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `true` when the provisioning state will not change without another request.
/// A missing state counts as terminal.
pub fn is_terminal_state(state: Option<&str>) -> bool {
    match state {
        None => true,
        Some(s) => s.eq_ignore_ascii_case("succeeded") || is_failed_state(s),
    }
}

/// `Failed`, `Canceled` or `Cancelled`, in any case
pub fn is_failed_state(state: &str) -> bool {
    matches!(
        state.to_ascii_lowercase().as_str(),
        "failed" | "canceled" | "cancelled"
    )
}
