//! Provisioning driver
//!
//! Walks a [`Plan`] one step at a time. Each created resource is read back and
//! stored in [`Provisioned`] so later steps can reference it. The first failing
//! step stops the run; nothing already created is rolled back.

use crate::api::{ResourceApi, ResourceClients};
use crate::error::{CloudError, Result};
use crate::model::{
    NetworkInterface, PublicIpAddress, Resource, ResourceKind, StorageAccount, VirtualMachine,
    VirtualNetwork,
};
use crate::naming::ResourceNames;
use crate::operations;
use crate::params;
use crate::plan::{Plan, RunReport, Step};
use std::time::Instant;
use vmflow_config::RunOptions;

/// Resources created so far in this run
#[derive(Debug, Default)]
pub struct Provisioned {
    pub storage_account: Option<StorageAccount>,
    pub virtual_network: Option<VirtualNetwork>,
    pub public_ip: Option<PublicIpAddress>,
    pub network_interface: Option<NetworkInterface>,
    pub virtual_machine: Option<VirtualMachine>,
}

impl Provisioned {
    pub fn contains(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::StorageAccount => self.storage_account.is_some(),
            ResourceKind::VirtualNetwork => self.virtual_network.is_some(),
            ResourceKind::PublicIpAddress => self.public_ip.is_some(),
            ResourceKind::NetworkInterface => self.network_interface.is_some(),
            ResourceKind::VirtualMachine => self.virtual_machine.is_some(),
        }
    }

    fn forget(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::StorageAccount => self.storage_account = None,
            ResourceKind::VirtualNetwork => self.virtual_network = None,
            ResourceKind::PublicIpAddress => self.public_ip = None,
            ResourceKind::NetworkInterface => self.network_interface = None,
            ResourceKind::VirtualMachine => self.virtual_machine = None,
        }
    }
}

fn missing(step: ResourceKind, upstream: ResourceKind) -> CloudError {
    CloudError::MissingDependency(format!(
        "cannot create {} before a {} exists",
        step, upstream
    ))
}

async fn create_and_read_back<R: Resource>(
    api: &dyn ResourceApi<R>,
    resource_group: &str,
    name: &str,
    parameters: &R,
) -> Result<R> {
    operations::create(api, resource_group, name, parameters).await?;
    operations::get(api, resource_group, name).await
}

pub struct Orchestrator<'a> {
    clients: &'a dyn ResourceClients,
    options: &'a RunOptions,
    names: ResourceNames,
    plan: Plan,
}

impl<'a> Orchestrator<'a> {
    /// Fails when the options cannot produce a VM, before any remote call
    pub fn new(
        clients: &'a dyn ResourceClients,
        options: &'a RunOptions,
        names: ResourceNames,
    ) -> Result<Self> {
        options.virtual_machine.require_admin_credential()?;
        Ok(Self {
            clients,
            options,
            names,
            plan: Plan::for_run(options),
        })
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn names(&self) -> &ResourceNames {
        &self.names
    }

    /// Run every step in order, stopping at the first failure
    pub async fn run(&self) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::default();
        let mut provisioned = Provisioned::default();

        tracing::info!(
            "Starting run in subscription {} (resource group {}, suffix {})",
            self.clients.subscription_id(),
            self.options.resource_group,
            self.names.suffix
        );

        for step in &self.plan.steps {
            match self.execute(*step, &mut provisioned).await {
                Ok(Some(message)) => report.add_success(*step, message),
                Ok(None) => {}
                Err(error) => {
                    tracing::error!("Step '{}' failed: {}", step, error);
                    report.set_failure(*step, error);
                    break;
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }

    async fn execute(&self, step: Step, provisioned: &mut Provisioned) -> Result<Option<String>> {
        match step {
            Step::ListVirtualMachines => {
                let vms = operations::list(self.clients.virtual_machines()).await?;
                Ok(Some(format!("{} virtual machine(s)", vms.len())))
            }
            Step::EnsureResourceGroup => {
                let rg = &self.options.resource_group;
                let group = operations::ensure_resource_group(
                    self.clients.resource_groups(),
                    rg,
                    &params::resource_group(self.options),
                )
                .await?;
                Ok(Some(format!(
                    "resource group {}",
                    group.name.as_deref().unwrap_or(rg)
                )))
            }
            Step::Create(kind) => self.create(kind, provisioned).await.map(Some),
            Step::Delete(kind) => self.delete(kind, provisioned).await,
        }
    }

    async fn create(&self, kind: ResourceKind, provisioned: &mut Provisioned) -> Result<String> {
        let rg = self.options.resource_group.as_str();
        let names = &self.names;
        let name = names.for_kind(kind);

        match kind {
            ResourceKind::StorageAccount => {
                let storage = self.options.storage.as_ref().ok_or_else(|| {
                    CloudError::InvalidConfig("storage account step is disabled".to_string())
                })?;
                let body = params::storage_account(self.options, storage, names);
                let account =
                    create_and_read_back(self.clients.storage_accounts(), rg, name, &body).await?;
                provisioned.storage_account = Some(account);
            }
            ResourceKind::VirtualNetwork => {
                let body = params::virtual_network(self.options, names);
                let vnet =
                    create_and_read_back(self.clients.virtual_networks(), rg, name, &body).await?;
                provisioned.virtual_network = Some(vnet);
            }
            ResourceKind::PublicIpAddress => {
                let body = params::public_ip(self.options, names);
                let pip = create_and_read_back(self.clients.public_ip_addresses(), rg, name, &body)
                    .await?;
                provisioned.public_ip = Some(pip);
            }
            ResourceKind::NetworkInterface => {
                let vnet = provisioned
                    .virtual_network
                    .as_ref()
                    .ok_or_else(|| missing(kind, ResourceKind::VirtualNetwork))?;
                let pip = provisioned
                    .public_ip
                    .as_ref()
                    .ok_or_else(|| missing(kind, ResourceKind::PublicIpAddress))?;
                let body = params::network_interface(self.options, names, vnet, pip)?;
                let nic = create_and_read_back(self.clients.network_interfaces(), rg, name, &body)
                    .await?;
                provisioned.network_interface = Some(nic);
            }
            ResourceKind::VirtualMachine => {
                let nic = provisioned
                    .network_interface
                    .as_ref()
                    .ok_or_else(|| missing(kind, ResourceKind::NetworkInterface))?;
                let body = params::virtual_machine(self.options, names, nic)?;
                let vm =
                    create_and_read_back(self.clients.virtual_machines(), rg, name, &body).await?;
                provisioned.virtual_machine = Some(vm);
            }
        }

        Ok(format!("{} {}", kind, name))
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        provisioned: &mut Provisioned,
    ) -> Result<Option<String>> {
        let name = self.names.for_kind(kind);
        if !provisioned.contains(kind) {
            tracing::warn!("Skipping delete of {} {}: not created in this run", kind, name);
            return Ok(None);
        }

        let rg = self.options.resource_group.as_str();
        match kind {
            ResourceKind::StorageAccount => {
                operations::delete(self.clients.storage_accounts(), rg, name).await?
            }
            ResourceKind::VirtualNetwork => {
                operations::delete(self.clients.virtual_networks(), rg, name).await?
            }
            ResourceKind::PublicIpAddress => {
                operations::delete(self.clients.public_ip_addresses(), rg, name).await?
            }
            ResourceKind::NetworkInterface => {
                operations::delete(self.clients.network_interfaces(), rg, name).await?
            }
            ResourceKind::VirtualMachine => {
                operations::delete(self.clients.virtual_machines(), rg, name).await?
            }
        }
        provisioned.forget(kind);

        Ok(Some(format!("{} {}", kind, name)))
    }
}
