//! Resource operations
//!
//! Each function performs exactly one remote call and logs before and after
//! it. Errors from the client are returned untouched.

use crate::api::{ComputeApi, ResourceApi, ResourceGroupApi};
use crate::error::Result;
use crate::model::{ApiOperation, PowerAction, Resource, ResourceGroup};

pub async fn create<R: Resource>(
    api: &dyn ResourceApi<R>,
    resource_group: &str,
    name: &str,
    parameters: &R,
) -> Result<R> {
    tracing::info!("Creating {} {} in {}...", R::KIND, name, resource_group);
    let created = api.create_or_update(resource_group, name, parameters).await?;
    tracing::info!(
        "Created {} {} ({})",
        R::KIND,
        created.name().unwrap_or(name),
        created.provisioning_state().unwrap_or("unknown state")
    );
    Ok(created)
}

pub async fn get<R: Resource>(
    api: &dyn ResourceApi<R>,
    resource_group: &str,
    name: &str,
) -> Result<R> {
    tracing::debug!("Getting {} {}", R::KIND, name);
    let resource = api.get(resource_group, name).await?;
    tracing::info!(
        "{} {}: location={} state={}",
        R::KIND,
        resource.name().unwrap_or(name),
        resource.location().unwrap_or("-"),
        resource.provisioning_state().unwrap_or("-")
    );
    Ok(resource)
}

/// List every resource of one type, logging one line per entry
pub async fn list<R: Resource>(api: &dyn ResourceApi<R>) -> Result<Vec<R>> {
    tracing::info!("Listing {} resources...", R::KIND);
    let resources = api.list_all().await?;
    for (index, resource) in resources.iter().enumerate() {
        tracing::info!(
            "[{}] {} location={} state={}",
            index,
            resource.name().unwrap_or("-"),
            resource.location().unwrap_or("-"),
            resource.provisioning_state().unwrap_or("-")
        );
    }
    tracing::info!("Found {} {} resource(s)", resources.len(), R::KIND);
    Ok(resources)
}

pub async fn delete<R: Resource>(
    api: &dyn ResourceApi<R>,
    resource_group: &str,
    name: &str,
) -> Result<()> {
    tracing::info!("Deleting {} {}...", R::KIND, name);
    api.delete(resource_group, name).await?;
    tracing::info!("Deleted {} {}", R::KIND, name);
    Ok(())
}

pub async fn list_operations(api: &dyn ComputeApi) -> Result<Vec<ApiOperation>> {
    tracing::info!("Listing compute operations...");
    let operations = api.list_operations().await?;
    for (index, op) in operations.iter().enumerate() {
        let description = op
            .display
            .as_ref()
            .and_then(|d| d.description.as_deref())
            .unwrap_or("");
        tracing::info!("[{}] {}: {}", index, op.name, description);
    }
    tracing::info!("Found {} operation(s)", operations.len());
    Ok(operations)
}

pub async fn power_action(
    api: &dyn ComputeApi,
    resource_group: &str,
    name: &str,
    action: PowerAction,
) -> Result<()> {
    tracing::info!("Running {} on virtual machine {}...", action, name);
    api.power_action(resource_group, name, action).await?;
    tracing::info!("Finished {} on virtual machine {}", action, name);
    Ok(())
}

pub async fn ensure_resource_group(
    api: &dyn ResourceGroupApi,
    name: &str,
    parameters: &ResourceGroup,
) -> Result<ResourceGroup> {
    tracing::info!("Ensuring resource group {} in {}...", name, parameters.location);
    let group = api.create_or_update(name, parameters).await?;
    tracing::info!("Resource group {} is ready", group.name.as_deref().unwrap_or(name));
    Ok(group)
}
