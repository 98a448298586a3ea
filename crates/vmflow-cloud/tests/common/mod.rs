//! In-memory resource clients for driver tests

use async_trait::async_trait;
use serde_json::{Value, json};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use vmflow_cloud::model::{
    ApiOperation, NetworkInterface, OperationDisplay, PowerAction, PublicIpAddress, Resource,
    ResourceGroup, ResourceKind, StorageAccount, VirtualMachine, VirtualNetwork,
};
use vmflow_cloud::{
    CloudError, ComputeApi, ResourceApi, ResourceClients, ResourceGroupApi, Result,
};
use vmflow_config::{RunOptions, Settings};

pub const SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(ResourceKind),
    Create(ResourceKind, String),
    Get(ResourceKind, String),
    Delete(ResourceKind, String),
    EnsureResourceGroup(String),
    ListOperations,
    Power(String, PowerAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    List,
    Create,
    Get,
    Delete,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    store: Vec<(ResourceKind, String, Value)>,
    failures: Vec<(Verb, ResourceKind)>,
}

type Shared = Arc<Mutex<State>>;

fn provider_path(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::VirtualNetwork => "Microsoft.Network/virtualNetworks",
        ResourceKind::PublicIpAddress => "Microsoft.Network/publicIPAddresses",
        ResourceKind::NetworkInterface => "Microsoft.Network/networkInterfaces",
        ResourceKind::VirtualMachine => "Microsoft.Compute/virtualMachines",
        ResourceKind::StorageAccount => "Microsoft.Storage/storageAccounts",
    }
}

fn injected(verb: Verb, kind: ResourceKind) -> CloudError {
    CloudError::Api {
        status: Some(400),
        code: Some("InjectedFailure".to_string()),
        message: format!("{:?} {} failed", verb, kind),
    }
}

fn not_found(kind: ResourceKind, name: &str) -> CloudError {
    CloudError::Api {
        status: Some(404),
        code: Some("ResourceNotFound".to_string()),
        message: format!("{} '{}' was not found", kind, name),
    }
}

fn check(state: &State, verb: Verb, kind: ResourceKind) -> Result<()> {
    if state.failures.contains(&(verb, kind)) {
        return Err(injected(verb, kind));
    }
    Ok(())
}

pub struct FakeCollection<R> {
    state: Shared,
    _marker: PhantomData<fn() -> R>,
}

impl<R> FakeCollection<R> {
    fn new(state: Shared) -> Self {
        Self {
            state,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for FakeCollection<R> {
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &R,
    ) -> Result<R> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(R::KIND, name.to_string()));
        check(&state, Verb::Create, R::KIND)?;

        let id = format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
            SUBSCRIPTION_ID,
            resource_group,
            provider_path(R::KIND),
            name
        );
        let mut value = serde_json::to_value(parameters)?;
        value["id"] = json!(id);
        value["name"] = json!(name);
        value["properties"]["provisioningState"] = json!("Succeeded");
        if let Some(Value::Array(subnets)) = value.pointer_mut("/properties/subnets") {
            for subnet in subnets {
                let subnet_name = subnet["name"].as_str().unwrap_or("default").to_string();
                subnet["id"] = json!(format!("{}/subnets/{}", id, subnet_name));
            }
        }

        state.store.retain(|(k, n, _)| !(*k == R::KIND && n == name));
        state.store.push((R::KIND, name.to_string(), value.clone()));
        Ok(serde_json::from_value(value)?)
    }

    async fn get(&self, _resource_group: &str, name: &str) -> Result<R> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Get(R::KIND, name.to_string()));
        check(&state, Verb::Get, R::KIND)?;
        let value = state
            .store
            .iter()
            .find(|(k, n, _)| *k == R::KIND && n == name)
            .map(|(_, _, v)| v.clone())
            .ok_or_else(|| not_found(R::KIND, name))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn list_all(&self) -> Result<Vec<R>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List(R::KIND));
        check(&state, Verb::List, R::KIND)?;
        state
            .store
            .iter()
            .filter(|(k, _, _)| *k == R::KIND)
            .map(|(_, _, v)| serde_json::from_value(v.clone()).map_err(CloudError::from))
            .collect()
    }

    async fn delete(&self, _resource_group: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(R::KIND, name.to_string()));
        check(&state, Verb::Delete, R::KIND)?;
        let before = state.store.len();
        state.store.retain(|(k, n, _)| !(*k == R::KIND && n == name));
        if state.store.len() == before {
            return Err(not_found(R::KIND, name));
        }
        Ok(())
    }
}

pub struct FakeClients {
    state: Shared,
    virtual_networks: FakeCollection<VirtualNetwork>,
    public_ip_addresses: FakeCollection<PublicIpAddress>,
    network_interfaces: FakeCollection<NetworkInterface>,
    virtual_machines: FakeCollection<VirtualMachine>,
    storage_accounts: FakeCollection<StorageAccount>,
}

#[allow(dead_code)]
impl FakeClients {
    pub fn new() -> Self {
        let state = Shared::default();
        Self {
            virtual_networks: FakeCollection::new(state.clone()),
            public_ip_addresses: FakeCollection::new(state.clone()),
            network_interfaces: FakeCollection::new(state.clone()),
            virtual_machines: FakeCollection::new(state.clone()),
            storage_accounts: FakeCollection::new(state.clone()),
            state,
        }
    }

    /// Make every `verb` call on `kind` fail with an API error
    pub fn fail_on(&self, verb: Verb, kind: ResourceKind) {
        self.state.lock().unwrap().failures.push((verb, kind));
    }

    /// Put a resource in the store without recording a call
    pub fn seed(&self, kind: ResourceKind, name: &str, value: Value) {
        self.state
            .lock()
            .unwrap()
            .store
            .push((kind, name.to_string(), value));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn created(&self) -> Vec<ResourceKind> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(kind, _) => Some(kind),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<ResourceKind> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(kind, _) => Some(kind),
                _ => None,
            })
            .collect()
    }

    pub fn stored(&self, kind: ResourceKind) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .store
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, n, _)| n.clone())
            .collect()
    }
}

#[async_trait]
impl ComputeApi for FakeClients {
    async fn list_operations(&self) -> Result<Vec<ApiOperation>> {
        self.state.lock().unwrap().calls.push(Call::ListOperations);
        Ok(vec![
            ApiOperation {
                name: "Microsoft.Compute/virtualMachines/read".to_string(),
                display: Some(OperationDisplay {
                    provider: Some("Microsoft Compute".to_string()),
                    resource: Some("Virtual Machines".to_string()),
                    operation: Some("Get Virtual Machine".to_string()),
                    description: Some("Get the properties of a virtual machine".to_string()),
                }),
                origin: Some("user,system".to_string()),
            },
            ApiOperation {
                name: "Microsoft.Compute/virtualMachines/start/action".to_string(),
                display: None,
                origin: None,
            },
        ])
    }

    async fn power_action(
        &self,
        _resource_group: &str,
        name: &str,
        action: PowerAction,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Power(name.to_string(), action));
        let exists = state
            .store
            .iter()
            .any(|(k, n, _)| *k == ResourceKind::VirtualMachine && n == name);
        if !exists {
            return Err(not_found(ResourceKind::VirtualMachine, name));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceGroupApi for FakeClients {
    async fn create_or_update(
        &self,
        name: &str,
        parameters: &ResourceGroup,
    ) -> Result<ResourceGroup> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::EnsureResourceGroup(name.to_string()));
        let mut group = parameters.clone();
        group.name = Some(name.to_string());
        group.id = Some(format!(
            "/subscriptions/{}/resourceGroups/{}",
            SUBSCRIPTION_ID, name
        ));
        Ok(group)
    }
}

impl ResourceClients for FakeClients {
    fn subscription_id(&self) -> &str {
        SUBSCRIPTION_ID
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
        self
    }

    fn resource_groups(&self) -> &dyn ResourceGroupApi {
        self
    }
}

/// Resolved options from YAML with an admin password filled in
#[allow(dead_code)]
pub fn run_options(yaml: &str) -> RunOptions {
    let mut settings = Settings::from_yaml(yaml).unwrap();
    settings.virtual_machine.admin_password = Some("P@ssw0rd!123".to_string());
    settings.resolve().unwrap()
}
