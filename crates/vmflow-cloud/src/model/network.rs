use super::{ResourceKind, Sku, SubResource, impl_resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Virtual network with its address space and subnets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub properties: VirtualNetworkProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_space: Option<AddressSpace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<Subnet>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    #[serde(default)]
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: SubnetProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

impl VirtualNetwork {
    /// The subnet a network interface attaches to
    pub fn first_subnet(&self) -> Option<&Subnet> {
        self.properties.subnets.first()
    }
}

impl_resource!(VirtualNetwork, ResourceKind::VirtualNetwork);

/// Public IP address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: PublicIpAddressProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressProperties {
    #[serde(
        rename = "publicIPAllocationMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allocation_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_settings: Option<DnsSettings>,
    #[serde(default, skip_serializing)]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name_label: Option<String>,
    #[serde(default, skip_serializing)]
    pub fqdn: Option<String>,
}

impl_resource!(PublicIpAddress, ResourceKind::PublicIpAddress);

/// Network interface with a single IP configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub properties: NetworkInterfaceProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceProperties {
    #[serde(default)]
    pub ip_configurations: Vec<IpConfiguration>,
    #[serde(default, skip_serializing)]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: IpConfigurationProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpConfigurationProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubResource>,
    #[serde(
        rename = "publicIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_address: Option<SubResource>,
    #[serde(
        rename = "privateIPAllocationMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub private_ip_allocation_method: Option<String>,
    #[serde(rename = "privateIPAddress", default, skip_serializing)]
    pub private_ip_address: Option<String>,
}

impl NetworkInterface {
    /// Subnet ID of the first IP configuration
    pub fn subnet_id(&self) -> Option<&str> {
        self.properties
            .ip_configurations
            .first()
            .and_then(|c| c.properties.subnet.as_ref())
            .map(|s| s.id.as_str())
    }
}

impl_resource!(NetworkInterface, ResourceKind::NetworkInterface);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Resource;
    use serde_json::json;

    #[test]
    fn test_virtual_network_from_api() {
        let vnet: VirtualNetwork = serde_json::from_value(json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet1",
            "name": "vnet1",
            "location": "westus",
            "properties": {
                "addressSpace": { "addressPrefixes": ["10.0.0.0/16"] },
                "subnets": [{
                    "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/default",
                    "name": "default",
                    "properties": { "addressPrefix": "10.0.0.0/24", "provisioningState": "Succeeded" }
                }],
                "provisioningState": "Succeeded",
                "enableDdosProtection": false
            }
        }))
        .unwrap();

        assert_eq!(vnet.name(), Some("vnet1"));
        assert_eq!(vnet.provisioning_state(), Some("Succeeded"));
        assert!(vnet.first_subnet().unwrap().id.as_deref().unwrap().ends_with("/subnets/default"));
    }

    #[test]
    fn test_public_ip_request_body_uses_api_field_names() {
        let pip = PublicIpAddress {
            location: Some("westus".to_string()),
            sku: Some(Sku::new("Basic")),
            properties: PublicIpAddressProperties {
                allocation_method: Some("Dynamic".to_string()),
                dns_settings: Some(DnsSettings {
                    domain_name_label: Some("demo".to_string()),
                    fqdn: Some("ignored".to_string()),
                }),
                ip_address: Some("ignored".to_string()),
                provisioning_state: Some("ignored".to_string()),
            },
            ..Default::default()
        };

        let body = serde_json::to_value(&pip).unwrap();
        assert_eq!(
            body,
            json!({
                "location": "westus",
                "sku": { "name": "Basic" },
                "properties": {
                    "publicIPAllocationMethod": "Dynamic",
                    "dnsSettings": { "domainNameLabel": "demo" }
                }
            })
        );
    }

    #[test]
    fn test_network_interface_references() {
        let nic: NetworkInterface = serde_json::from_value(json!({
            "name": "nic1",
            "properties": {
                "ipConfigurations": [{
                    "name": "ipconfig1",
                    "properties": {
                        "subnet": { "id": "subnet-id" },
                        "publicIPAddress": { "id": "pip-id", "name": "pip1" },
                        "privateIPAllocationMethod": "Dynamic",
                        "privateIPAddress": "10.0.0.4"
                    }
                }]
            }
        }))
        .unwrap();

        assert_eq!(nic.subnet_id(), Some("subnet-id"));
        let config = &nic.properties.ip_configurations[0].properties;
        assert_eq!(config.public_ip_address.as_ref().unwrap().id, "pip-id");
        assert_eq!(config.private_ip_address.as_deref(), Some("10.0.0.4"));
        assert_eq!(nic.provisioning_state(), None);
    }
}
