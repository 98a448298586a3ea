//! Resource client traits
//!
//! Providers implement these traits to expose per-resource-type sub-clients
//! scoped to one subscription. Create and delete calls resolve only once the
//! remote operation has reached a terminal state.

use crate::error::Result;
use crate::model::{
    ApiOperation, NetworkInterface, PowerAction, PublicIpAddress, Resource, ResourceGroup,
    StorageAccount, VirtualMachine, VirtualNetwork,
};
use async_trait::async_trait;

/// Create/get/list/delete for one resource type
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    /// Create or update `name` in `resource_group`, waiting for provisioning to finish
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &R,
    ) -> Result<R>;

    /// Fetch the current representation of a resource
    async fn get(&self, resource_group: &str, name: &str) -> Result<R>;

    /// Every resource of this type in the subscription
    async fn list_all(&self) -> Result<Vec<R>>;

    /// Delete a resource, waiting for the deletion to finish
    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;
}

/// Compute operations beyond plain CRUD
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Operations the compute resource provider offers
    async fn list_operations(&self) -> Result<Vec<ApiOperation>>;

    /// Run a power action on a VM and wait for it to complete
    async fn power_action(
        &self,
        resource_group: &str,
        name: &str,
        action: PowerAction,
    ) -> Result<()>;
}

#[async_trait]
pub trait ResourceGroupApi: Send + Sync {
    /// Create the group, or update it if it exists
    async fn create_or_update(
        &self,
        name: &str,
        parameters: &ResourceGroup,
    ) -> Result<ResourceGroup>;
}

/// All sub-clients for one subscription
pub trait ResourceClients: Send + Sync {
    fn subscription_id(&self) -> &str;

    fn virtual_networks(&self) -> &dyn ResourceApi<VirtualNetwork>;

    fn public_ip_addresses(&self) -> &dyn ResourceApi<PublicIpAddress>;

    fn network_interfaces(&self) -> &dyn ResourceApi<NetworkInterface>;

    fn virtual_machines(&self) -> &dyn ResourceApi<VirtualMachine>;

    fn storage_accounts(&self) -> &dyn ResourceApi<StorageAccount>;

    fn compute(&self) -> &dyn ComputeApi;

    fn resource_groups(&self) -> &dyn ResourceGroupApi;
}
