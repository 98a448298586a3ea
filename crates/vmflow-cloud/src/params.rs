//! Request bodies built from resolved run options

use crate::error::{CloudError, Result};
use crate::model::{
    AddressSpace, DnsSettings, HardwareProfile, ImageReference, IpConfiguration,
    IpConfigurationProperties, LinuxConfiguration, ManagedDiskParameters, NetworkInterface,
    NetworkInterfaceProperties, NetworkInterfaceReference, NetworkInterfaceReferenceProperties,
    NetworkProfile, OsDisk, OsProfile, PublicIpAddress, PublicIpAddressProperties, Resource,
    ResourceGroup, Sku, SshConfiguration, SshPublicKey, StorageAccount, StorageProfile,
    SubResource, Subnet, SubnetProperties, VirtualMachine, VirtualMachineProperties,
    VirtualNetwork, VirtualNetworkProperties,
};
use crate::naming::ResourceNames;
use std::collections::HashMap;
use vmflow_config::{AdminCredential, RunOptions, StorageOptions};

pub const CREATED_BY_TAG: &str = "created-by";
pub const RUN_TAG: &str = "vmflow-run";

fn tags(names: &ResourceNames) -> HashMap<String, String> {
    HashMap::from([
        (CREATED_BY_TAG.to_string(), "vmflow".to_string()),
        (RUN_TAG.to_string(), names.suffix.clone()),
    ])
}

pub fn resource_group(options: &RunOptions) -> ResourceGroup {
    ResourceGroup {
        location: options.location.clone(),
        tags: HashMap::from([(CREATED_BY_TAG.to_string(), "vmflow".to_string())]),
        ..Default::default()
    }
}

pub fn virtual_network(options: &RunOptions, names: &ResourceNames) -> VirtualNetwork {
    let vnet = &options.virtual_network;
    VirtualNetwork {
        location: Some(options.location.clone()),
        tags: tags(names),
        properties: VirtualNetworkProperties {
            address_space: Some(AddressSpace {
                address_prefixes: vnet.address_prefixes.clone(),
            }),
            subnets: vec![Subnet {
                name: Some(vnet.subnet_name.clone()),
                properties: SubnetProperties {
                    address_prefix: Some(vnet.subnet_prefix.clone()),
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn public_ip(options: &RunOptions, names: &ResourceNames) -> PublicIpAddress {
    let pip = &options.public_ip;
    PublicIpAddress {
        location: Some(options.location.clone()),
        tags: tags(names),
        sku: Some(Sku::new(pip.sku.clone())),
        properties: PublicIpAddressProperties {
            allocation_method: Some(pip.allocation_method.to_string()),
            dns_settings: pip.dns_label.as_ref().map(|label| DnsSettings {
                domain_name_label: Some(label.clone()),
                fqdn: None,
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn storage_account(
    options: &RunOptions,
    storage: &StorageOptions,
    names: &ResourceNames,
) -> StorageAccount {
    StorageAccount {
        location: Some(options.location.clone()),
        tags: tags(names),
        sku: Some(Sku::new(storage.sku.clone())),
        kind: Some(storage.kind.clone()),
        ..Default::default()
    }
}

/// NIC attached to the first subnet of `vnet` and to `public_ip`
pub fn network_interface(
    options: &RunOptions,
    names: &ResourceNames,
    vnet: &VirtualNetwork,
    public_ip: &PublicIpAddress,
) -> Result<NetworkInterface> {
    let subnet_id = vnet
        .first_subnet()
        .and_then(|s| s.id.clone())
        .ok_or_else(|| {
            CloudError::MissingDependency(format!(
                "virtual network {} has no subnet with an ID",
                vnet.name().unwrap_or(&names.virtual_network)
            ))
        })?;
    let public_ip_id = public_ip.id().ok_or_else(|| {
        CloudError::MissingDependency(format!(
            "public IP address {} has no ID",
            public_ip.name().unwrap_or(&names.public_ip)
        ))
    })?;

    let nic = &options.network_interface;
    Ok(NetworkInterface {
        location: Some(options.location.clone()),
        tags: tags(names),
        properties: NetworkInterfaceProperties {
            ip_configurations: vec![IpConfiguration {
                name: Some(nic.ip_configuration_name.clone()),
                properties: IpConfigurationProperties {
                    subnet: Some(SubResource::new(subnet_id)),
                    public_ip_address: Some(SubResource::new(public_ip_id)),
                    private_ip_allocation_method: Some(nic.private_ip_allocation.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    })
}

/// VM attached to `nic`, booting the configured image
pub fn virtual_machine(
    options: &RunOptions,
    names: &ResourceNames,
    nic: &NetworkInterface,
) -> Result<VirtualMachine> {
    let nic_id = nic.id().ok_or_else(|| {
        CloudError::MissingDependency(format!(
            "network interface {} has no ID",
            nic.name().unwrap_or(&names.network_interface)
        ))
    })?;

    let vm = &options.virtual_machine;
    let (admin_password, linux_configuration) = match vm.require_admin_credential()? {
        AdminCredential::Password(password) => (Some(password.clone()), None),
        AdminCredential::SshPublicKey(key) => (
            None,
            Some(LinuxConfiguration {
                disable_password_authentication: Some(true),
                ssh: Some(SshConfiguration {
                    public_keys: vec![SshPublicKey {
                        path: format!("/home/{}/.ssh/authorized_keys", vm.admin_username),
                        key_data: key.clone(),
                    }],
                }),
            }),
        ),
    };

    Ok(VirtualMachine {
        location: Some(options.location.clone()),
        tags: tags(names),
        properties: VirtualMachineProperties {
            hardware_profile: Some(HardwareProfile {
                vm_size: vm.size.clone(),
            }),
            os_profile: Some(OsProfile {
                computer_name: Some(names.computer_name.clone()),
                admin_username: Some(vm.admin_username.clone()),
                admin_password,
                linux_configuration,
            }),
            network_profile: Some(NetworkProfile {
                network_interfaces: vec![NetworkInterfaceReference {
                    id: nic_id.to_string(),
                    properties: Some(NetworkInterfaceReferenceProperties {
                        primary: Some(true),
                    }),
                }],
            }),
            storage_profile: Some(StorageProfile {
                image_reference: Some(ImageReference {
                    publisher: Some(vm.image.publisher.clone()),
                    offer: Some(vm.image.offer.clone()),
                    sku: Some(vm.image.sku.clone()),
                    version: Some(vm.image.version.clone()),
                }),
                os_disk: Some(OsDisk {
                    name: Some(names.os_disk.clone()),
                    create_option: Some("FromImage".to_string()),
                    caching: Some("ReadWrite".to_string()),
                    managed_disk: Some(ManagedDiskParameters {
                        id: None,
                        storage_account_type: Some(vm.os_disk_storage_type.clone()),
                    }),
                    delete_option: Some("Delete".to_string()),
                }),
            }),
            ..Default::default()
        },
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmflow_config::Settings;

    fn options_with_password() -> RunOptions {
        let mut settings = Settings::default();
        settings.virtual_machine.admin_password = Some("P@ssw0rd!123".to_string());
        settings.resolve().unwrap()
    }

    fn names() -> ResourceNames {
        ResourceNames::new("vmflow", "0307090501")
    }

    #[test]
    fn test_virtual_network_defaults() {
        let vnet = virtual_network(&options_with_password(), &names());
        assert_eq!(vnet.location.as_deref(), Some("westus"));
        assert_eq!(
            vnet.properties.address_space.unwrap().address_prefixes,
            vec!["10.0.0.0/16"]
        );
        let subnet = &vnet.properties.subnets[0];
        assert_eq!(subnet.name.as_deref(), Some("default"));
        assert_eq!(subnet.properties.address_prefix.as_deref(), Some("10.0.0.0/24"));
        assert_eq!(vnet.tags.get(RUN_TAG).map(String::as_str), Some("0307090501"));
    }

    #[test]
    fn test_public_ip_without_dns_label() {
        let pip = public_ip(&options_with_password(), &names());
        assert_eq!(pip.properties.allocation_method.as_deref(), Some("Dynamic"));
        assert!(pip.properties.dns_settings.is_none());
    }

    #[test]
    fn test_network_interface_requires_subnet_id() {
        let options = options_with_password();
        let vnet = virtual_network(&options, &names());
        let pip = PublicIpAddress {
            id: Some("pip-id".to_string()),
            ..Default::default()
        };
        let err = network_interface(&options, &names(), &vnet, &pip).unwrap_err();
        assert!(matches!(err, CloudError::MissingDependency(_)));
    }

    #[test]
    fn test_network_interface_references_dependencies() {
        let options = options_with_password();
        let mut vnet = virtual_network(&options, &names());
        vnet.properties.subnets[0].id = Some("subnet-id".to_string());
        let pip = PublicIpAddress {
            id: Some("pip-id".to_string()),
            ..Default::default()
        };

        let nic = network_interface(&options, &names(), &vnet, &pip).unwrap();
        let config = &nic.properties.ip_configurations[0];
        assert_eq!(config.name.as_deref(), Some("ipconfig1"));
        assert_eq!(nic.subnet_id(), Some("subnet-id"));
        assert_eq!(
            config.properties.public_ip_address.as_ref().unwrap().id,
            "pip-id"
        );
    }

    #[test]
    fn test_virtual_machine_with_password() {
        let options = options_with_password();
        let nic = NetworkInterface {
            id: Some("nic-id".to_string()),
            ..Default::default()
        };
        let vm = virtual_machine(&options, &names(), &nic).unwrap();

        assert_eq!(vm.vm_size(), Some("Standard_B1s"));
        assert_eq!(vm.network_interface_ids(), vec!["nic-id"]);
        let os = vm.properties.os_profile.unwrap();
        assert_eq!(os.computer_name.as_deref(), Some("vmflowvm0307090501"));
        assert_eq!(os.admin_password.as_deref(), Some("P@ssw0rd!123"));
        assert!(os.linux_configuration.is_none());
    }

    #[test]
    fn test_virtual_machine_with_ssh_key() {
        let mut options = options_with_password();
        options.virtual_machine.admin_credential =
            Some(AdminCredential::SshPublicKey("ssh-ed25519 AAAA demo".to_string()));
        let nic = NetworkInterface {
            id: Some("nic-id".to_string()),
            ..Default::default()
        };
        let vm = virtual_machine(&options, &names(), &nic).unwrap();

        let os = vm.properties.os_profile.unwrap();
        assert!(os.admin_password.is_none());
        let linux = os.linux_configuration.unwrap();
        assert_eq!(linux.disable_password_authentication, Some(true));
        let key = &linux.ssh.unwrap().public_keys[0];
        assert_eq!(key.path, "/home/azureuser/.ssh/authorized_keys");
    }

    #[test]
    fn test_virtual_machine_without_credential() {
        let options = Settings::default().resolve().unwrap();
        let nic = NetworkInterface {
            id: Some("nic-id".to_string()),
            ..Default::default()
        };
        let err = virtual_machine(&options, &names(), &nic).unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
    }
}
