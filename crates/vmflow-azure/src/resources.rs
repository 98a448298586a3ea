//! Resource client trait implementations over [`ArmClient`]

use crate::arm::{
    ArmClient, COMPUTE_API_VERSION, NETWORK_API_VERSION, RESOURCES_API_VERSION,
    STORAGE_API_VERSION, with_api_version,
};
use crate::error::AzureError;
use crate::poller;
use async_trait::async_trait;
use reqwest::Method;
use std::marker::PhantomData;
use vmflow_cloud::model::{
    ApiOperation, NetworkInterface, PowerAction, PublicIpAddress, Resource, ResourceGroup,
    ResourceKind, StorageAccount, VirtualMachine, VirtualNetwork,
};
use vmflow_cloud::{ComputeApi, ResourceApi, ResourceClients, ResourceGroupApi, Result};

/// Provider namespace/type and API version for a resource kind
pub fn provider_for(kind: ResourceKind) -> (&'static str, &'static str) {
    match kind {
        ResourceKind::VirtualNetwork => ("Microsoft.Network/virtualNetworks", NETWORK_API_VERSION),
        ResourceKind::PublicIpAddress => {
            ("Microsoft.Network/publicIPAddresses", NETWORK_API_VERSION)
        }
        ResourceKind::NetworkInterface => {
            ("Microsoft.Network/networkInterfaces", NETWORK_API_VERSION)
        }
        ResourceKind::VirtualMachine => ("Microsoft.Compute/virtualMachines", COMPUTE_API_VERSION),
        ResourceKind::StorageAccount => ("Microsoft.Storage/storageAccounts", STORAGE_API_VERSION),
    }
}

/// Create/get/list/delete for one resource type
pub struct ArmCollection<R> {
    client: ArmClient,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> ArmCollection<R> {
    pub fn new(client: ArmClient) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    fn resource_url(&self, resource_group: &str, name: &str) -> String {
        let (provider, api_version) = provider_for(R::KIND);
        with_api_version(
            &self.client.resource_path(resource_group, provider, name),
            api_version,
        )
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for ArmCollection<R> {
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &R,
    ) -> Result<R> {
        let url = self.resource_url(resource_group, name);
        let body = serde_json::to_value(parameters)?;
        let response = self.client.send(Method::PUT, &url, Some(&body)).await?;

        match poller::wait(&self.client, response, Some(&url)).await? {
            Some(created) => Ok(serde_json::from_value(created)?),
            None => self.get(resource_group, name).await,
        }
    }

    async fn get(&self, resource_group: &str, name: &str) -> Result<R> {
        let url = self.resource_url(resource_group, name);
        Ok(self.client.get_json(&url).await?)
    }

    async fn list_all(&self) -> Result<Vec<R>> {
        let (provider, api_version) = provider_for(R::KIND);
        let url = with_api_version(&self.client.subscription_path(provider), api_version);
        Ok(self.client.list_pages(url).await?)
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()> {
        let url = self.resource_url(resource_group, name);
        let response = self.client.send(Method::DELETE, &url, None).await?;
        poller::wait(&self.client, response, None).await?;
        Ok(())
    }
}

/// Compute operations beyond CRUD
pub struct ArmCompute {
    client: ArmClient,
}

#[async_trait]
impl ComputeApi for ArmCompute {
    async fn list_operations(&self) -> Result<Vec<ApiOperation>> {
        let url = with_api_version(
            &format!(
                "{}/providers/Microsoft.Compute/operations",
                self.client.endpoint()
            ),
            COMPUTE_API_VERSION,
        );
        Ok(self.client.list_pages(url).await?)
    }

    async fn power_action(
        &self,
        resource_group: &str,
        name: &str,
        action: PowerAction,
    ) -> Result<()> {
        let (provider, api_version) = provider_for(ResourceKind::VirtualMachine);
        let url = with_api_version(
            &format!(
                "{}/{}",
                self.client.resource_path(resource_group, provider, name),
                action.path_segment()
            ),
            api_version,
        );
        let response = self.client.send(Method::POST, &url, None).await?;
        poller::wait(&self.client, response, None).await?;
        Ok(())
    }
}

pub struct ArmResourceGroups {
    client: ArmClient,
}

#[async_trait]
impl ResourceGroupApi for ArmResourceGroups {
    async fn create_or_update(
        &self,
        name: &str,
        parameters: &ResourceGroup,
    ) -> Result<ResourceGroup> {
        let url = with_api_version(
            &format!(
                "{}/subscriptions/{}/resourcegroups/{}",
                self.client.endpoint(),
                self.client.subscription_id(),
                name
            ),
            RESOURCES_API_VERSION,
        );
        let body = serde_json::to_value(parameters)?;
        let response = self.client.send(Method::PUT, &url, Some(&body)).await?;
        Ok(response.json().await.map_err(AzureError::from)?)
    }
}

/// Every resource client for one subscription
pub struct AzureClients {
    client: ArmClient,
    virtual_networks: ArmCollection<VirtualNetwork>,
    public_ip_addresses: ArmCollection<PublicIpAddress>,
    network_interfaces: ArmCollection<NetworkInterface>,
    virtual_machines: ArmCollection<VirtualMachine>,
    storage_accounts: ArmCollection<StorageAccount>,
    compute: ArmCompute,
    resource_groups: ArmResourceGroups,
}

impl AzureClients {
    pub fn new(client: ArmClient) -> Self {
        Self {
            virtual_networks: ArmCollection::new(client.clone()),
            public_ip_addresses: ArmCollection::new(client.clone()),
            network_interfaces: ArmCollection::new(client.clone()),
            virtual_machines: ArmCollection::new(client.clone()),
            storage_accounts: ArmCollection::new(client.clone()),
            compute: ArmCompute {
                client: client.clone(),
            },
            resource_groups: ArmResourceGroups {
                client: client.clone(),
            },
            client,
        }
    }
}

impl ResourceClients for AzureClients {
    fn subscription_id(&self) -> &str {
        self.client.subscription_id()
    }

    fn virtual_networks(&self) -> &dyn ResourceApi<VirtualNetwork> {
        &self.virtual_networks
    }

    fn public_ip_addresses(&self) -> &dyn ResourceApi<PublicIpAddress> {
        &self.public_ip_addresses
    }

    fn network_interfaces(&self) -> &dyn ResourceApi<NetworkInterface> {
        &self.network_interfaces
    }

    fn virtual_machines(&self) -> &dyn ResourceApi<VirtualMachine> {
        &self.virtual_machines
    }

    fn storage_accounts(&self) -> &dyn ResourceApi<StorageAccount> {
        &self.storage_accounts
    }

    fn compute(&self) -> &dyn ComputeApi {
        &self.compute
    }

    fn resource_groups(&self) -> &dyn ResourceGroupApi {
        &self.resource_groups
    }
}
